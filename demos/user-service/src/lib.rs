//! Demo user service: login and registration over Meridian RPC.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use meridian_provider::{MethodEntry, RpcService};

/// Outcome shared by every method response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCode {
    pub errcode: i32,
    pub errmsg: String,
}

impl ResultCode {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            errcode: 0,
            errmsg: String::new(),
        }
    }

    #[must_use]
    pub fn err(errcode: i32, errmsg: impl Into<String>) -> Self {
        Self {
            errcode,
            errmsg: errmsg.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub pwd: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub result: ResultCode,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub id: u32,
    pub name: String,
    pub pwd: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub result: ResultCode,
    pub success: bool,
}

/// The demo service. Credentials are hard-coded; a real implementation
/// would consult a user store.
#[derive(Default)]
pub struct UserService;

impl UserService {
    fn login(name: &str, pwd: &str) -> bool {
        info!(name = %name, "doing local login");
        name == "zhang_san" && pwd == "123456"
    }

    fn register(id: u32, name: &str, _pwd: &str) -> bool {
        info!(id, name = %name, "doing local registration");
        id > 0 && !name.is_empty()
    }
}

impl RpcService for UserService {
    fn service_name(&self) -> &str {
        "UserService"
    }

    fn methods(self: Arc<Self>) -> Vec<MethodEntry> {
        vec![
            MethodEntry::new("Login", |req: LoginRequest| async move {
                if Self::login(&req.name, &req.pwd) {
                    LoginResponse {
                        result: ResultCode::ok(),
                        success: true,
                    }
                } else {
                    LoginResponse {
                        result: ResultCode::err(1, "invalid name or password"),
                        success: false,
                    }
                }
            }),
            MethodEntry::new("Register", |req: RegisterRequest| async move {
                if Self::register(req.id, &req.name, &req.pwd) {
                    RegisterResponse {
                        result: ResultCode::ok(),
                        success: true,
                    }
                } else {
                    RegisterResponse {
                        result: ResultCode::err(2, "invalid registration"),
                        success: false,
                    }
                }
            }),
        ]
    }
}
