//! Command tokens and dispatch replies.

use std::fmt;

/// A command exchanged between a worker and its master.
///
/// Commands travel as opaque tokens on the wire; parsing happens once at
/// the connection edge, after which all dispatch is a match over this
/// closed enum. Tokens that do not map to a variant are reported back to
/// the peer as a structured error reply rather than tearing the
/// connection down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Master confirms the worker's sync round completed.
    SyncAck,
    /// Master begins pushing a file to the worker.
    SyncStart,
    /// Master signals an inbound file transfer is complete.
    SyncEnd,
    /// Master reports a problem with an inbound file transfer.
    SyncError,
    /// Forwarded distributed-query response for local consumers.
    QueryResponse,
    /// Forwarded distributed-query error for local consumers.
    QueryError,
    /// Distributed-query request to enqueue for local processing.
    QueryRequest,
    /// Worker asks the master for permission to push a file batch.
    RequestPermission,
    /// Worker pushes its integrity file batch to the master.
    FileSync,
    /// Worker asks the master for the current integrity-sync status.
    IntegrityCheck,
}

impl Command {
    /// Returns the wire token for this command.
    pub fn as_token(&self) -> &'static str {
        match self {
            Command::SyncAck => "sync-ack",
            Command::SyncStart => "sync-start",
            Command::SyncEnd => "sync-end",
            Command::SyncError => "sync-error",
            Command::QueryResponse => "query-response",
            Command::QueryError => "query-error",
            Command::QueryRequest => "query",
            Command::RequestPermission => "sync-permission",
            Command::FileSync => "sync-files",
            Command::IntegrityCheck => "integrity-check",
        }
    }

    /// Parses a wire token into a command.
    ///
    /// Returns `None` for unknown tokens; the caller decides how to
    /// report them.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "sync-ack" => Some(Command::SyncAck),
            "sync-start" => Some(Command::SyncStart),
            "sync-end" => Some(Command::SyncEnd),
            "sync-error" => Some(Command::SyncError),
            "query-response" => Some(Command::QueryResponse),
            "query-error" => Some(Command::QueryError),
            "query" => Some(Command::QueryRequest),
            "sync-permission" => Some(Command::RequestPermission),
            "sync-files" => Some(Command::FileSync),
            "integrity-check" => Some(Command::IntegrityCheck),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Status of a dispatch reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// The command was accepted.
    Ok,
    /// The command was rejected.
    Err,
}

/// Structured reply returned for every inbound command.
///
/// Every inbound frame gets exactly one reply, including unknown
/// commands, so a protocol-level surprise never closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Whether the command was accepted.
    pub status: ReplyStatus,
    /// Human-readable detail, possibly empty.
    pub detail: String,
}

impl Reply {
    /// Creates an `Ok` reply with no detail.
    pub fn ok() -> Self {
        Self {
            status: ReplyStatus::Ok,
            detail: String::new(),
        }
    }

    /// Creates an `Ok` reply with a detail message.
    pub fn ok_with(detail: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            detail: detail.into(),
        }
    }

    /// Creates an `Err` reply with a detail message.
    pub fn err(detail: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Err,
            detail: detail.into(),
        }
    }

    /// Creates the reply sent for an unrecognized wire token.
    pub fn unknown_command(token: &str) -> Self {
        Self::err(format!("unknown command '{token}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let all = [
            Command::SyncAck,
            Command::SyncStart,
            Command::SyncEnd,
            Command::SyncError,
            Command::QueryResponse,
            Command::QueryError,
            Command::QueryRequest,
            Command::RequestPermission,
            Command::FileSync,
            Command::IntegrityCheck,
        ];

        for command in all {
            assert_eq!(Command::parse(command.as_token()), Some(command));
        }
    }

    #[test]
    fn unknown_token_parses_to_none() {
        assert_eq!(Command::parse("no-exists"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("SYNC-ACK"), None);
    }

    #[test]
    fn unknown_command_reply() {
        let reply = Reply::unknown_command("no-exists");
        assert_eq!(reply.status, ReplyStatus::Err);
        assert_eq!(reply.detail, "unknown command 'no-exists'");
    }

    #[test]
    fn ok_replies() {
        assert_eq!(Reply::ok().detail, "");
        assert_eq!(Reply::ok_with("Thanks").detail, "Thanks");
        assert_eq!(Reply::ok().status, ReplyStatus::Ok);
    }
}
