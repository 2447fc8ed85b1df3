use serde::{Deserialize, Serialize};

/// Payload of the tokens the HR backend signs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Username
    pub sub: String,
    /// Numeric id of a [`Role`]
    pub role: u8,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
    pub employee_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl TryFrom<u8> for Role {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            1 => Role::Admin,
            2 => Role::Hr,
            3 => Role::Employee,
            4 => Role::System,
            5 => Role::ApiUser,
            other => return Err(other),
        })
    }
}

impl Role {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Admin console access.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}
