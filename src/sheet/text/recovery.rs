//! Recovery policies for malformed and missing fields

use std::fmt;

use log::warn;

use super::config::ParseErrorAction;
use crate::common::{Error, ParseErrorInfo, Result};

/// Which rule the input broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The record ended before the established field count was reached
    MissingField,
    /// A quoted field was not terminated, or was followed by garbage
    MalformedField,
}

/// Notification passed to a parse error handler.
///
/// The handler may change [`action`](Self::action) to override the recovery
/// for this occurrence only. The action starts out as
/// [`ParseErrorAction::ThrowException`].
#[derive(Debug)]
pub struct ParseErrorEvent {
    kind: ParseErrorKind,
    info: ParseErrorInfo,
    /// Resolution chosen by the handler
    pub action: ParseErrorAction,
}

impl ParseErrorEvent {
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Diagnostic context of the failure
    pub fn info(&self) -> &ParseErrorInfo {
        &self.info
    }

    /// The error raised if the event is not resolved
    pub fn to_error(&self) -> Error {
        self.kind.error(self.info.clone())
    }
}

impl ParseErrorKind {
    fn error(self, info: ParseErrorInfo) -> Error {
        match self {
            ParseErrorKind::MissingField => Error::MissingField(info),
            ParseErrorKind::MalformedField => Error::MalformedField(info),
        }
    }
}

/// Callback subscribed to parse error notifications.
pub type ParseErrorHandler = Box<dyn FnMut(&mut ParseErrorEvent) + Send>;

/// Decides how a parse error is resolved.
pub(crate) struct RecoveryPolicy {
    default_action: ParseErrorAction,
    handler: Option<ParseErrorHandler>,
}

impl fmt::Debug for RecoveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPolicy")
            .field("default_action", &self.default_action)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl RecoveryPolicy {
    pub(crate) fn new(default_action: ParseErrorAction, handler: Option<ParseErrorHandler>) -> Self {
        RecoveryPolicy {
            default_action,
            handler,
        }
    }

    pub(crate) fn set_handler(&mut self, handler: Option<ParseErrorHandler>) {
        self.handler = handler;
    }

    /// Resolve one parse error.
    ///
    /// `Ok(())` means the caller should advance to the next line and continue;
    /// any other outcome is returned as an error.
    pub(crate) fn resolve(&mut self, kind: ParseErrorKind, info: ParseErrorInfo) -> Result<()> {
        let (action, info) = match self.default_action {
            ParseErrorAction::RaiseEvent => {
                let mut event = ParseErrorEvent {
                    kind,
                    info,
                    action: ParseErrorAction::ThrowException,
                };
                if let Some(handler) = self.handler.as_mut() {
                    handler(&mut event);
                }
                if event.action == ParseErrorAction::RaiseEvent {
                    return Err(Error::InvalidRecoveryAction(event.info));
                }
                (event.action, event.info)
            },
            action => (action, info),
        };

        match action {
            ParseErrorAction::AdvanceToNextLine => {
                warn!("skipping to next line: {:?} {}", kind, info);
                Ok(())
            },
            _ => Err(kind.error(info)),
        }
    }
}
