// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The four identity fields a voter fills in before casting a ballot.
///
/// In most cases, it is enough to use the higher-level builder API.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoterField {
    Name,
    /// The student identification number.
    Id,
    Faculty,
    Program,
}

impl VoterField {
    pub const ALL: [VoterField; 4] = [
        VoterField::Name,
        VoterField::Id,
        VoterField::Faculty,
        VoterField::Program,
    ];
}

impl Display for VoterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VoterField::Name => "name",
            VoterField::Id => "id",
            VoterField::Faculty => "faculty",
            VoterField::Program => "program",
        };
        write!(f, "{}", s)
    }
}

/// The identity of the voter filling the form.
///
/// Values are stored as typed, untrimmed. A field counts as filled when its
/// trimmed content is non-empty.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoterInfo {
    pub name: String,
    pub id: String,
    pub faculty: String,
    pub program: String,
}

impl VoterInfo {
    pub fn field(&self, field: VoterField) -> &str {
        match field {
            VoterField::Name => &self.name,
            VoterField::Id => &self.id,
            VoterField::Faculty => &self.faculty,
            VoterField::Program => &self.program,
        }
    }

    pub fn set_field(&mut self, field: VoterField, value: &str) {
        let slot = match field {
            VoterField::Name => &mut self.name,
            VoterField::Id => &mut self.id,
            VoterField::Faculty => &mut self.faculty,
            VoterField::Program => &mut self.program,
        };
        *slot = value.to_string();
    }

    /// The fields that are still empty after trimming, in display order.
    pub fn missing_fields(&self) -> Vec<VoterField> {
        VoterField::ALL
            .iter()
            .filter(|f| self.field(**f).trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// One of the two candidates registered for the election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    /// Short identifier used by the selection commands (for example `c1`).
    pub id: String,
    /// The name as printed on the ballot.
    pub name: String,
}

// ******** Output data structures *********

/// A read-only snapshot of the session, as handed to the rendering layer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionState {
    pub voter: VoterInfo,
    pub selected_candidate: Option<String>,
    pub has_voted: bool,
    pub remaining_seconds: u32,
    pub confirmation_pending: bool,
}

/// What the session is missing before `submit` can go through.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MissingInput {
    pub fields: Vec<VoterField>,
    pub candidate: bool,
}

impl Display for MissingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.fields.is_empty() {
            let names: Vec<String> = self.fields.iter().map(|x| x.to_string()).collect();
            write!(f, "fill in: {}", names.join(", "))?;
            if self.candidate {
                write!(f, "; ")?;
            }
        }
        if self.candidate {
            write!(f, "choose one of the candidates")?;
        }
        Ok(())
    }
}

/// The request issued by `submit` once all the preconditions hold.
///
/// The session stays pending until the request is resolved with
/// `resolve_confirmation`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConfirmationRequest {
    pub candidate: Candidate,
    /// Human-readable prompt, ready for display.
    pub message: String,
}

/// Proof that a vote was recorded, with the material for the success notice.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteReceipt {
    pub voter_name: String,
    pub voter_id: String,
    pub candidate: Candidate,
}

impl VoteReceipt {
    /// The success notice shown to the voter.
    pub fn message(&self) -> String {
        format!(
            "The choice by {} ({}) has been recorded.",
            self.voter_name.trim(),
            self.voter_id.trim()
        )
    }
}

/// Outcome of a full submit round-trip through a confirmation collaborator.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SubmitOutcome {
    Recorded(VoteReceipt),
    /// The voter declined the confirmation. Not an error: the session is
    /// back to its editable state, unchanged.
    Declined,
}

/// Errors that keep a session operation from completing.
///
/// All of them are expected, user-facing conditions and leave the session in
/// a well-defined state.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SessionErrors {
    /// A vote was already recorded for this session.
    AlreadyVoted,
    /// Required fields are empty or no candidate is selected.
    IncompleteSubmission(MissingInput),
    /// A confirmation round-trip is already outstanding.
    AlreadyPending,
    /// `resolve_confirmation` was called with no outstanding request.
    NoPendingVote,
    /// The candidate id is not part of the roster.
    UnknownCandidate(String),
    /// The election needs exactly two candidates.
    InvalidRoster(usize),
}

impl Error for SessionErrors {}

impl Display for SessionErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionErrors::AlreadyVoted => {
                write!(f, "you have already submitted your choice")
            }
            SessionErrors::IncompleteSubmission(missing) => {
                write!(f, "incomplete submission: {}", missing)
            }
            SessionErrors::AlreadyPending => {
                write!(f, "a confirmation is already waiting for an answer")
            }
            SessionErrors::NoPendingVote => {
                write!(f, "no confirmation is outstanding")
            }
            SessionErrors::UnknownCandidate(id) => {
                write!(f, "unknown candidate id: {}", id)
            }
            SessionErrors::InvalidRoster(n) => {
                write!(f, "the election takes exactly 2 candidates, got {}", n)
            }
        }
    }
}

// ********* Collaborators **********

/// The external yes/no prompt invoked before committing a vote.
///
/// The presentation (modal dialog, terminal prompt) is entirely the
/// collaborator's concern. The session only consumes the boolean outcome.
pub trait ConfirmVote {
    fn confirm(&mut self, message: &str) -> bool;
}
