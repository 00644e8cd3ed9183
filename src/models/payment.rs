use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt;
use std::str::FromStr;

use super::account::{Account, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentProvider {
    Moncash,
    BankTransfer,
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moncash => f.pad("MONCASH"),
            Self::BankTransfer => f.pad("BANK_TRANSFER"),
        }
    }
}

impl FromStr for PaymentProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MONCASH" => Ok(Self::Moncash),
            "BANK_TRANSFER" | "BANK" => Ok(Self::BankTransfer),
            other => Err(format!("unknown provider '{other}' (expected moncash or bank-transfer)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Htg,
    Usd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Htg => f.pad("HTG"),
            Self::Usd => f.pad("USD"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HTG" => Ok(Self::Htg),
            "USD" => Ok(Self::Usd),
            other => Err(format!("unknown currency '{other}' (expected HTG or USD)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Manual payment declaration, reviewed later by an admin.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[rule(bank_named_for_transfer(provider, bank_name))]
pub struct PaymentRequest {
    #[validate(custom(paid_plan))]
    pub plan_requested: Plan,
    pub provider: PaymentProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[validate(exclusive_minimum = 0.0, message = "amount must be a positive number")]
    pub amount: f64,
    pub currency: Currency,
    #[validate(
        pattern = r"^\d{4}-(0[1-9]|1[0-2])$",
        message = "billing month must use the YYYY-MM format"
    )]
    pub billing_month: String,
    #[validate(min_length = 1, message = "payment reference is required")]
    #[validate(pattern = r"\S", message = "payment reference is required")]
    pub reference: String,
}

fn paid_plan(plan: &Plan) -> Result<(), serde_valid::validation::Error> {
    if plan.is_paid() {
        Ok(())
    } else {
        Err(serde_valid::validation::Error::Custom(
            "plan must be STANDARD or TEAM".to_string(),
        ))
    }
}

fn bank_named_for_transfer(
    provider: &PaymentProvider,
    bank_name: &Option<String>,
) -> Result<(), serde_valid::validation::Error> {
    let named = bank_name.as_deref().map_or(false, |b| !b.trim().is_empty());
    if *provider == PaymentProvider::BankTransfer && !named {
        return Err(serde_valid::validation::Error::Custom(
            "bank name is required for bank transfers".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub uid: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    pub plan_requested: Plan,
    pub provider: PaymentProvider,
    #[serde(default)]
    pub bank_name: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub billing_month: String,
    pub reference: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub receipt_path: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /admin/payments/{id}`: the payment plus the payer's account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetail {
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(default)]
    pub user: Option<Account>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReview {
    pub decision: ReviewDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Payment {
    pub fn has_receipt(&self) -> bool {
        self.receipt_path.as_deref().map_or(false, |p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            plan_requested: Plan::Standard,
            provider: PaymentProvider::Moncash,
            bank_name: None,
            amount: 500.0,
            currency: Currency::Htg,
            billing_month: "2024-02".into(),
            reference: "MC-123".into(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_free_plan_rejected() {
        let req = PaymentRequest {
            plan_requested: Plan::Free,
            ..request()
        };
        assert!(req.validate().unwrap_err().to_string().contains("STANDARD or TEAM"));
    }

    #[test]
    fn test_amount_and_reference_required() {
        let req = PaymentRequest {
            amount: 0.0,
            ..request()
        };
        assert!(req.validate().is_err());
        let req = PaymentRequest {
            reference: "  ".into(),
            ..request()
        };
        assert!(req.validate().unwrap_err().to_string().contains("reference"));
    }

    #[test]
    fn test_billing_month_format() {
        for bad in ["2024-2", "2024-13", "02-2024", "2024-02-01"] {
            let req = PaymentRequest {
                billing_month: bad.into(),
                ..request()
            };
            assert!(req.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_bank_transfer_requires_bank() {
        let req = PaymentRequest {
            provider: PaymentProvider::BankTransfer,
            ..request()
        };
        assert!(req.validate().unwrap_err().to_string().contains("bank name"));
        let req = PaymentRequest {
            provider: PaymentProvider::BankTransfer,
            bank_name: Some("Unibank".into()),
            ..request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_wire_shape() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(value["planRequested"], "STANDARD");
        assert_eq!(value["provider"], "MONCASH");
        assert_eq!(value["currency"], "HTG");
        assert_eq!(value["billingMonth"], "2024-02");
        assert!(value.get("bankName").is_none());
    }
}
