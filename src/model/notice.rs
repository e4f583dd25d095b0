use serde::Serialize;
use utoipa::ToSchema;

/// A message for the operator, produced by attendance operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RenderedNotice {
    #[schema(value_type = String, example = "success")]
    pub level: &'static str,
    #[schema(example = "Applied 2 change(s).")]
    pub message: String,
}

impl Notice {
    /// Turns the notice into its wire form and logs it at the matching level.
    pub fn render(&self) -> RenderedNotice {
        let (level, message) = match self {
            Notice::Info(m) => {
                tracing::info!(notice = %m);
                ("info", m)
            }
            Notice::Success(m) => {
                tracing::info!(notice = %m, "success");
                ("success", m)
            }
            Notice::Warning(m) => {
                tracing::warn!(notice = %m);
                ("warning", m)
            }
            Notice::Error(m) => {
                tracing::error!(notice = %m);
                ("error", m)
            }
        };
        RenderedNotice {
            level,
            message: message.clone(),
        }
    }
}

pub fn render_all(notices: &[Notice]) -> Vec<RenderedNotice> {
    notices.iter().map(Notice::render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_has_its_own_level() {
        let rendered = render_all(&[
            Notice::Info("a".into()),
            Notice::Success("b".into()),
            Notice::Warning("c".into()),
            Notice::Error("d".into()),
        ]);
        let levels: Vec<_> = rendered.iter().map(|n| n.level).collect();
        assert_eq!(levels, vec!["info", "success", "warning", "error"]);
        assert_eq!(rendered[3].message, "d");
    }

    #[test]
    fn rendered_notice_serializes_flat() {
        let json = serde_json::to_value(Notice::Warning("careful".into()).render()).unwrap();
        assert_eq!(json, serde_json::json!({"level": "warning", "message": "careful"}));
    }
}
