use std::path::PathBuf;

use serde_valid::Validate;

use crate::cli::error::CliError;
use crate::cli::kantik_client::Upload;
use crate::cli::progress;
use crate::console::commands::cli::context::short_date;
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::{Payment, PaymentRequest};

pub(crate) fn print_payment_table(payments: &[Payment], with_user: bool) {
    let user_header = if with_user { "USER" } else { "" };
    println!(
        "{:<24} {:<9} {:<14} {:>10} {:<4} {:<8} {:<10} {:<28} {}",
        "ID", "PLAN", "PROVIDER", "AMOUNT", "CUR", "MONTH", "STATUS", "REFERENCE", user_header
    );
    println!("{}", "─".repeat(120));
    for p in payments {
        let user = if with_user {
            p.user_email.as_deref().unwrap_or(&p.uid)
        } else {
            ""
        };
        println!(
            "{:<24} {:<9} {:<14} {:>10.2} {:<4} {:<8} {} {:<8} {:<28} {}",
            p.id,
            p.plan_requested,
            p.provider,
            p.amount,
            p.currency,
            p.billing_month,
            progress::status_icon(p.status.as_str()),
            p.status,
            p.reference,
            user,
        );
    }
}

/// `kantik payments list [--json]`
pub struct ListPaymentsCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl ListPaymentsCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        session.start("payments").await?;
        let payments = session.client().list_payments().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&payments)?);
        } else if payments.is_empty() {
            eprintln!("No payments submitted yet.");
        } else {
            print_payment_table(&payments, false);
            for p in payments.iter().filter(|p| p.note.is_some()) {
                eprintln!(
                    "{} ({}): {}",
                    p.id,
                    short_date(p.reviewed_at.as_deref()),
                    p.note.as_deref().unwrap_or_default()
                );
            }
        }
        Ok(())
    }
}

impl CallableTrait for ListPaymentsCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik payments submit --plan .. --provider .. --amount .. --month .. --reference .. [--receipt FILE]`
///
/// Declares a manual payment (MonCash or bank transfer). An admin reviews it;
/// approval extends the plan by 30 days.
pub struct SubmitPaymentCommand {
    pub ctx: CommandContext,
    pub request: PaymentRequest,
    pub receipt: Option<PathBuf>,
}

impl SubmitPaymentCommand {
    pub fn new(ctx: CommandContext, request: PaymentRequest, receipt: Option<PathBuf>) -> Self {
        Self {
            ctx,
            request,
            receipt,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        self.request.validate()?;
        // Read the receipt before submitting so a bad path sends nothing.
        let receipt = self.receipt.as_deref().map(Upload::from_path).transpose()?;

        let mut session = self.ctx.session()?;
        session.start("payments").await?;
        let payment = session.client().submit_payment(&self.request).await?;
        eprintln!("✓ Payment {} submitted for review", payment.id);

        if let Some(receipt) = receipt {
            let pb = progress::spinner("Uploading receipt...");
            match session.client().upload_receipt(&payment.id, receipt).await {
                Ok(()) => progress::finish_success(&pb, "Receipt uploaded"),
                Err(err) => {
                    progress::finish_error(&pb, "Receipt upload failed");
                    return Err(err);
                }
            }
        }
        println!("{}", payment.id);
        Ok(())
    }
}

impl CallableTrait for SubmitPaymentCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}
