use clap::ValueEnum;

use crate::error::InputError;
use crate::gesture::{DragOffset, KeyCode};
use crate::models::DocumentType;

/// One line of reviewer input in the `review` loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewInput {
    Key(KeyCode),
    Drag(DragOffset),
    Summary,
    Dismiss,
    RequestDocuments {
        document_type: DocumentType,
        email_body: String,
    },
    Reset,
    Notifications,
    Open(String),
    Quit,
}

pub fn parse_line(line: &str) -> Result<ReviewInput, InputError> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => Err(InputError::Empty),
        "right" => Ok(ReviewInput::Key(KeyCode::ArrowRight)),
        "left" => Ok(ReviewInput::Key(KeyCode::ArrowLeft)),
        "up" => Ok(ReviewInput::Key(KeyCode::ArrowUp)),
        "ArrowRight" | "ArrowLeft" | "ArrowUp" => command.parse().map(ReviewInput::Key),
        "drag" => parse_drag(rest).map(ReviewInput::Drag),
        "summary" => Ok(ReviewInput::Summary),
        "dismiss" => Ok(ReviewInput::Dismiss),
        "docs" => {
            let (kind, body) = match rest.split_once(char::is_whitespace) {
                Some((kind, body)) => (kind, body.trim()),
                None => (rest, ""),
            };
            if kind.is_empty() {
                return Err(InputError::MissingArgument("docs"));
            }
            let document_type = DocumentType::from_str(&kind.replace('_', "-"), true)
                .map_err(|_| InputError::BadDocumentType(kind.to_string()))?;
            Ok(ReviewInput::RequestDocuments {
                document_type,
                email_body: body.to_string(),
            })
        }
        "reset" => Ok(ReviewInput::Reset),
        "notifications" => Ok(ReviewInput::Notifications),
        "open" if rest.is_empty() => Err(InputError::MissingArgument("open")),
        "open" => Ok(ReviewInput::Open(rest.to_string())),
        "quit" | "exit" => Ok(ReviewInput::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

fn parse_drag(rest: &str) -> Result<DragOffset, InputError> {
    let mut parts = rest.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => {
            Ok(DragOffset::new(x, y))
        }
        _ => Err(InputError::BadDrag(rest.to_string())),
    }
}
