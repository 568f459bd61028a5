//! Sends the generated invoice PDF as a single multipart email over an
//! implicit-TLS SMTP relay (SMTPS, port 465).

use std::fs;
use std::path::{Path, PathBuf};

use lettre::{
    message::{header::ContentType, Attachment, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::EmailError;

/// Everything one send needs. The credential is an app password typed into
/// the wizard; it is never persisted.
#[derive(Debug, Clone)]
pub struct EmailRequest {
    pub recipient: String,
    pub sender: String,
    pub password: String,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

/// Default subject line offered by the wizard.
pub fn default_subject(invoice_number: &str) -> String {
    format!("Invoice {invoice_number}")
}

/// Default body offered by the wizard.
pub fn default_body(invoice_number: &str, customer: &str, company: &str) -> String {
    format!(
        "Please find attached invoice {invoice_number} for {customer}.\n\nThank you,\n{company}"
    )
}

pub fn send_invoice(config: &SmtpConfig, request: &EmailRequest) -> Result<(), EmailError> {
    let pdf = fs::read(&request.attachment)
        .map_err(|err| EmailError::Transport(format!("could not read attachment: {err}")))?;
    let filename = attachment_filename(&request.attachment);

    let content_type = ContentType::parse("application/pdf")
        .map_err(|err| EmailError::Transport(err.to_string()))?;
    let message = Message::builder()
        .from(parse_mailbox(&request.sender)?)
        .to(parse_mailbox(&request.recipient)?)
        .subject(&request.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(request.body.clone()))
                .singlepart(Attachment::new(filename).body(pdf, content_type)),
        )
        .map_err(|err| EmailError::Transport(err.to_string()))?;

    let credentials = Credentials::new(request.sender.clone(), request.password.clone());
    let mailer = SmtpTransport::relay(&config.smtp_relay)
        .map_err(|err| EmailError::Transport(err.to_string()))?
        .credentials(credentials)
        .build();

    match mailer.send(&message) {
        Ok(_) => {
            info!(recipient = %request.recipient, "invoice email sent");
            Ok(())
        }
        // The relay reports a rejected AUTH as a permanent 5xx; everything
        // else (DNS, TLS, timeouts, transient 4xx) is a transport problem.
        Err(err) if err.is_permanent() => Err(EmailError::Auth),
        Err(err) => Err(EmailError::Transport(err.to_string())),
    }
}

fn parse_mailbox(address: &str) -> Result<lettre::message::Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::Transport(format!("invalid email address: {address}")))
}

fn attachment_filename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_names_invoice_and_customer() {
        let body = default_body("INV-42", "Acme Corp", "Widgets Ltd");
        assert!(body.contains("invoice INV-42 for Acme Corp"));
        assert!(body.ends_with("Widgets Ltd"));
        assert_eq!(default_subject("INV-42"), "Invoice INV-42");
    }

    #[test]
    fn missing_attachment_is_a_transport_failure() {
        let config = SmtpConfig::default();
        let request = EmailRequest {
            recipient: "client@example.com".to_string(),
            sender: "me@example.com".to_string(),
            password: "secret".to_string(),
            subject: "Invoice".to_string(),
            body: "hi".to_string(),
            attachment: PathBuf::from("/no/such/invoice.pdf"),
        };
        assert!(matches!(
            send_invoice(&config, &request),
            Err(EmailError::Transport(_))
        ));
    }

    #[test]
    fn attachment_filename_falls_back() {
        assert_eq!(attachment_filename(Path::new("a/b/invoice_7.pdf")), "invoice_7.pdf");
        assert_eq!(attachment_filename(Path::new("/")), "invoice.pdf");
    }
}
