use crate::config::EmailConfig;
use crate::error::AppResult;
use crate::external::BrevoEmailService;
use async_trait::async_trait;
use std::sync::Arc;

/// The two transactional mails the platform sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    VerificationCode,
    PasswordResetCode,
}

impl EmailKind {
    pub fn subject(&self) -> &'static str {
        match self {
            EmailKind::VerificationCode => "Código de verificación - Aula Click",
            EmailKind::PasswordResetCode => "Recuperación de contraseña - Aula Click",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub kind: EmailKind,
    pub code: String,
    /// Greeting name, only used by the reset mail.
    pub first_name: Option<String>,
}

impl EmailMessage {
    pub fn verification(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            kind: EmailKind::VerificationCode,
            code: code.to_string(),
            first_name: None,
        }
    }

    pub fn password_reset(to: &str, code: &str, first_name: &str) -> Self {
        Self {
            to: to.to_string(),
            kind: EmailKind::PasswordResetCode,
            code: code.to_string(),
            first_name: Some(first_name.to_string()),
        }
    }

    pub fn html_body(&self) -> String {
        match self.kind {
            EmailKind::VerificationCode => format!(
                "<html><body style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>¡Bienvenido a Aula Click!</h2>\
                 <p>Usa este código para completar tu registro:</p>\
                 <p style=\"font-size: 40px; letter-spacing: 8px; font-weight: bold;\">{code}</p>\
                 <p>Puedes pedir un nuevo código después de 60 segundos.</p>\
                 <p style=\"color: #718096;\">Si no solicitaste este registro, ignora este correo.</p>\
                 </body></html>",
                code = self.code
            ),
            EmailKind::PasswordResetCode => format!(
                "<html><body style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Hola {name},</h2>\
                 <p>Recibimos una solicitud para restablecer tu contraseña. Tu código es:</p>\
                 <p style=\"font-size: 40px; letter-spacing: 8px; font-weight: bold;\">{code}</p>\
                 <p>El código expira en 10 minutos.</p>\
                 <p style=\"color: #e53e3e;\">Si no fuiste tú, ignora este correo; tu cuenta sigue segura.</p>\
                 </body></html>",
                name = escape_html(self.first_name.as_deref().unwrap_or("")),
                code = self.code
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Outbound email collaborator. Failures come back as `ExternalApiError`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}

pub type SharedEmailSender = Arc<dyn EmailSender>;

/// Development fallback used when no Brevo key is configured: the code is
/// written to the log instead of being mailed.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEmailSender;

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let banner = "=".repeat(60);
        let title = match message.kind {
            EmailKind::VerificationCode => "VERIFICATION CODE (console mode)",
            EmailKind::PasswordResetCode => "PASSWORD RESET CODE (console mode)",
        };
        log::info!(
            "\n{banner}\n{title}\n{banner}\nEmail: {}\nCode: {}\n{banner}",
            message.to,
            message.code
        );
        Ok(())
    }
}

pub fn email_sender_from_config(config: &EmailConfig) -> AppResult<SharedEmailSender> {
    if config.api_key.trim().is_empty() {
        log::warn!("BREVO_API_KEY not set, emails will be printed to the log");
        return Ok(Arc::new(ConsoleEmailSender));
    }
    Ok(Arc::new(BrevoEmailService::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_mail_greets_by_first_name() {
        let msg = EmailMessage::password_reset("ana@example.com", "012345", "Ana");
        let html = msg.html_body();
        assert!(html.contains("Hola Ana"));
        assert!(html.contains("012345"));
        assert_eq!(msg.kind.subject(), "Recuperación de contraseña - Aula Click");
    }

    #[test]
    fn test_reset_mail_escapes_the_name() {
        let msg = EmailMessage::password_reset(
            "ana@example.com",
            "012345",
            "<a href=\"https://evil.example\">Ana</a> & co",
        );
        let html = msg.html_body();
        assert!(!html.contains("<a href"));
        assert!(html.contains("&lt;a href=&quot;https://evil.example&quot;&gt;Ana&lt;/a&gt; &amp; co"));
    }

    #[test]
    fn test_verification_mail_contains_code() {
        let msg = EmailMessage::verification("ana@example.com", "987654");
        assert!(msg.html_body().contains("987654"));
        assert!(msg.first_name.is_none());
    }

    #[test]
    fn test_missing_api_key_selects_console() {
        let sender = email_sender_from_config(&EmailConfig::default());
        assert!(sender.is_ok());
    }

    #[tokio::test]
    async fn test_console_sender_always_succeeds() {
        let msg = EmailMessage::verification("ana@example.com", "111111");
        assert!(ConsoleEmailSender.send(&msg).await.is_ok());
    }
}
