//! 成绩通知
//!
//! 期末成绩保存后向学生发送邮件。发送在写入提交之后异步进行，失败只记录日志。

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::MailConfig;
use crate::errors::{AcademicError, Result};
use crate::models::grades::entities::EvaluationKind;

/// 通知内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeNotice {
    pub student_name: String,
    pub student_email: String,
    pub subject_name: String,
    pub score: Decimal,
    pub kind: EvaluationKind,
    pub date: chrono::NaiveDate,
    pub notes: String,
}

impl GradeNotice {
    /// 只有带邮箱的期末成绩才需要通知
    pub fn should_send(&self) -> bool {
        self.kind == EvaluationKind::Final && !self.student_email.trim().is_empty()
    }

    pub fn subject_line(&self) -> &'static str {
        "Nueva calificación final registrada"
    }

    pub fn body(&self) -> String {
        let notes = if self.notes.trim().is_empty() {
            "N/A"
        } else {
            self.notes.as_str()
        };
        format!(
            "Hola {},\n\n\
            Se registró/actualizó tu calificación final en {}.\n\
            Nota: {}\n\
            Fecha: {}\n\
            Observaciones: {}\n\n\
            Por favor, revisa la plataforma para más detalles.",
            self.student_name,
            self.subject_name,
            self.score,
            self.date.format("%Y-%m-%d"),
            notes
        )
    }
}

#[async_trait]
pub trait GradeNotifier: Send + Sync {
    async fn notify(&self, notice: &GradeNotice) -> Result<()>;
}

/// 未启用邮件时使用
pub struct NoopNotifier;

#[async_trait]
impl GradeNotifier for NoopNotifier {
    async fn notify(&self, notice: &GradeNotice) -> Result<()> {
        debug!(
            "Mail disabled, skipping grade notice for {}",
            notice.student_email
        );
        Ok(())
    }
}

/// SMTP 邮件通知
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notice: &GradeNotice) -> Result<Message> {
        Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| AcademicError::notification(format!("Invalid from email: {e}")))?,
            )
            .to(notice
                .student_email
                .parse()
                .map_err(|e| AcademicError::notification(format!("Invalid to email: {e}")))?)
            .subject(notice.subject_line())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())
            .map_err(|e| AcademicError::notification(e.to_string()))
    }

    fn send_blocking(config: &MailConfig, email: &Message) -> Result<()> {
        let mut builder = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| AcademicError::notification(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        builder
            .build()
            .send(email)
            .map_err(|e| AcademicError::notification(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl GradeNotifier for SmtpNotifier {
    async fn notify(&self, notice: &GradeNotice) -> Result<()> {
        let email = self.build_message(notice)?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(&config, &email))
            .await
            .map_err(|e| AcademicError::notification(format!("Mail task failed: {e}")))?
    }
}

/// 根据配置构建通知器
pub fn build_notifier(config: &MailConfig) -> Arc<dyn GradeNotifier> {
    if config.enabled {
        Arc::new(SmtpNotifier::new(config.clone()))
    } else {
        Arc::new(NoopNotifier)
    }
}

/// 写入提交后派发通知，失败只记录 WARN
pub fn dispatch(notifier: Arc<dyn GradeNotifier>, notice: GradeNotice) {
    if !notice.should_send() {
        return;
    }
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notice).await {
            warn!(
                "Grade notification to {} failed: {}",
                notice.student_email, e
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn notice(kind: EvaluationKind) -> GradeNotice {
        GradeNotice {
            student_name: "Ana Gomez".into(),
            student_email: "ana@example.com".into(),
            subject_name: "Algebra".into(),
            score: Decimal::from_str("4.50").unwrap(),
            kind,
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_only_final_grades_with_email_are_sent() {
        assert!(notice(EvaluationKind::Final).should_send());
        assert!(!notice(EvaluationKind::Quiz).should_send());
        let mut no_email = notice(EvaluationKind::Final);
        no_email.student_email = String::new();
        assert!(!no_email.should_send());
    }

    #[test]
    fn test_body_contents() {
        let body = notice(EvaluationKind::Final).body();
        assert!(body.contains("Algebra"));
        assert!(body.contains("Nota: 4.50"));
        assert!(body.contains("Fecha: 2024-03-01"));
        assert!(body.contains("Observaciones: N/A"));
    }

    struct FailingNotifier(Arc<AtomicUsize>);

    #[async_trait]
    impl GradeNotifier for FailingNotifier {
        async fn notify(&self, _notice: &GradeNotice) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(AcademicError::notification("smtp unavailable"))
        }
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier: Arc<dyn GradeNotifier> = Arc::new(FailingNotifier(calls.clone()));
        dispatch(notifier.clone(), notice(EvaluationKind::Final));
        dispatch(notifier, notice(EvaluationKind::Midterm));
        for _ in 0..50 {
            if calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_mail_builds_noop() {
        let config = MailConfig::default();
        let _notifier = build_notifier(&config);
        assert!(!config.enabled);
    }
}
