use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use super::{AppError, Role};

/// Backend collections exposed through the add/edit/view/list/approve/reject pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Banks,
    Users,
    Admins,
    Wallets,
    Deposits,
    Withdrawals,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Banks,
        ResourceKind::Users,
        ResourceKind::Admins,
        ResourceKind::Wallets,
        ResourceKind::Deposits,
        ResourceKind::Withdrawals,
    ];

    /// Path segment on the backend
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::Banks => "bank",
            ResourceKind::Users => "user",
            ResourceKind::Admins => "admin",
            ResourceKind::Wallets => "wallet",
            ResourceKind::Deposits => "fiat/deposit",
            ResourceKind::Withdrawals => "fiat/withdraw",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Banks => "Banks",
            ResourceKind::Users => "Users",
            ResourceKind::Admins => "Admins",
            ResourceKind::Wallets => "Wallets",
            ResourceKind::Deposits => "Deposit requests",
            ResourceKind::Withdrawals => "Withdraw requests",
        }
    }

    /// Fields that must be present when adding a record
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Banks => &["bankName", "accountNumber", "accountHolder"],
            ResourceKind::Users | ResourceKind::Admins => &["fullName", "email", "password"],
            ResourceKind::Wallets => &["coinCode", "address"],
            ResourceKind::Deposits | ResourceKind::Withdrawals => &["amount", "bankId"],
        }
    }

    /// Lowest role allowed to list and view
    pub fn view_role(&self) -> Role {
        match self {
            ResourceKind::Users => Role::Admin,
            ResourceKind::Admins => Role::SuperAdmin,
            _ => Role::Member,
        }
    }

    /// Lowest role allowed to add and edit
    pub fn manage_role(&self) -> Role {
        match self {
            ResourceKind::Banks | ResourceKind::Users | ResourceKind::Wallets => Role::Admin,
            ResourceKind::Admins => Role::SuperAdmin,
            ResourceKind::Deposits | ResourceKind::Withdrawals => Role::Member,
        }
    }

    /// Whether records go through the approve/reject workflow
    pub fn supports_review(&self) -> bool {
        matches!(self, ResourceKind::Deposits | ResourceKind::Withdrawals)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Banks => "banks",
            ResourceKind::Users => "users",
            ResourceKind::Admins => "admins",
            ResourceKind::Wallets => "wallets",
            ResourceKind::Deposits => "deposits",
            ResourceKind::Withdrawals => "withdrawals",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches('s') {
            "bank" => Ok(ResourceKind::Banks),
            "user" | "member" => Ok(ResourceKind::Users),
            "admin" => Ok(ResourceKind::Admins),
            "wallet" => Ok(ResourceKind::Wallets),
            "deposit" => Ok(ResourceKind::Deposits),
            "withdrawal" | "withdraw" => Ok(ResourceKind::Withdrawals),
            _ => Err(AppError::validation(
                "resource",
                format!(
                    "unknown resource '{}', expected one of banks, users, admins, wallets, deposits, withdrawals",
                    s
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Add,
    Edit,
    View,
    List,
    Approve,
    Reject,
}

impl ResourceAction {
    pub fn path(&self) -> &'static str {
        match self {
            ResourceAction::Add => "add",
            ResourceAction::Edit => "edit",
            ResourceAction::View => "view",
            ResourceAction::List => "list",
            ResourceAction::Approve => "approve",
            ResourceAction::Reject => "reject",
        }
    }
}

// Ids come back as numbers from some endpoints and strings from others
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_holder: String,
}

/// A platform user or admin account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub role_id: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub coin_code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for FiatRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FiatRequestStatus::Pending => write!(f, "PENDING"),
            FiatRequestStatus::Approved => write!(f, "APPROVED"),
            FiatRequestStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Fiat deposit or withdraw request awaiting review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub full_name: String,
    pub status: FiatRequestStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One line of a resource listing, independent of the record type
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRow {
    pub id: String,
    pub summary: String,
    pub reviewable: bool,
}

impl From<Bank> for ResourceRow {
    fn from(bank: Bank) -> Self {
        Self {
            summary: format!(
                "{}: {} ({})",
                bank.bank_name, bank.account_number, bank.account_holder
            ),
            id: bank.id,
            reviewable: false,
        }
    }
}

impl From<Member> for ResourceRow {
    fn from(member: Member) -> Self {
        let state = if member.is_active { "active" } else { "inactive" };
        Self {
            summary: format!(
                "{} <{}> [{}, {}]",
                member.full_name,
                member.email,
                Role::from_role_id(&member.role_id),
                state
            ),
            id: member.id,
            reviewable: false,
        }
    }
}

impl From<Wallet> for ResourceRow {
    fn from(wallet: Wallet) -> Self {
        Self {
            summary: format!(
                "{} {} ({})",
                wallet.coin_code, wallet.balance, wallet.address
            ),
            id: wallet.id,
            reviewable: false,
        }
    }
}

impl From<FiatRequest> for ResourceRow {
    fn from(request: FiatRequest) -> Self {
        Self {
            summary: format!(
                "{:.2} via {} by {} [{}]",
                request.amount, request.bank_name, request.full_name, request.status
            ),
            reviewable: request.status == FiatRequestStatus::Pending,
            id: request.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_singular_and_plural() {
        assert_eq!("banks".parse::<ResourceKind>().unwrap(), ResourceKind::Banks);
        assert_eq!("Bank".parse::<ResourceKind>().unwrap(), ResourceKind::Banks);
        assert_eq!(
            "withdrawals".parse::<ResourceKind>().unwrap(),
            ResourceKind::Withdrawals
        );
        assert!("coins".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn only_fiat_requests_are_reviewable() {
        for kind in ResourceKind::ALL {
            assert_eq!(
                kind.supports_review(),
                matches!(kind, ResourceKind::Deposits | ResourceKind::Withdrawals)
            );
        }
    }

    #[test]
    fn fiat_request_accepts_numeric_id() {
        let request: FiatRequest = serde_json::from_str(
            r#"{"id":17,"amount":250000.0,"bankName":"BCA","fullName":"Jane","status":"PENDING"}"#,
        )
        .unwrap();

        assert_eq!(request.id, "17");
        let row = ResourceRow::from(request);
        assert!(row.reviewable);
        assert!(row.summary.contains("BCA"));
    }
}
