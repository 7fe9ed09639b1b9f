mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;

/// Countdown at session start, in seconds.
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 80;

const ROSTER_SIZE: usize = 2;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::ops::AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// One voter's complete interaction, from form load to optional reset.
///
/// The session owns all the mutable state: the voter fields, the selected
/// candidate, the submit-once flag, the countdown and the tally. It moves
/// between two states: editable (`has_voted == false`) and submitted. The
/// only way back from submitted is [`VotingSession::reset`].
///
/// Submission is a two-phase protocol: [`VotingSession::submit`] checks the
/// preconditions and issues a [`ConfirmationRequest`], and
/// [`VotingSession::resolve_confirmation`] either commits the vote or drops
/// the request. [`VotingSession::submit_with`] drives both phases through a
/// [`ConfirmVote`] collaborator in one call.
///
/// The tally is scoped to the session instance, not to one ballot: `reset`
/// reinitializes everything else but keeps the recorded votes.
pub struct VotingSession {
    // In roster order. Guaranteed to hold exactly two entries at construction.
    roster: Vec<(Candidate, CandidateId)>,
    voter: VoterInfo,
    selected: Option<CandidateId>,
    has_voted: bool,
    // The candidate captured by an outstanding confirmation request.
    pending: Option<CandidateId>,
    remaining_seconds: u32,
    starting_seconds: u32,
    tally: HashMap<CandidateId, VoteCount>,
}

impl VotingSession {
    /// Creates a session for the given roster.
    ///
    /// The roster must contain exactly two candidates; it is immutable for
    /// the life of the session. The tally starts at zero for every candidate.
    pub fn new(
        candidates: &[Candidate],
        countdown_seconds: u32,
    ) -> Result<VotingSession, SessionErrors> {
        if candidates.len() != ROSTER_SIZE {
            return Err(SessionErrors::InvalidRoster(candidates.len()));
        }
        let roster: Vec<(Candidate, CandidateId)> = candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), CandidateId((idx + 1) as u32)))
            .collect();
        let tally: HashMap<CandidateId, VoteCount> = roster
            .iter()
            .map(|(_, cid)| (*cid, VoteCount::EMPTY))
            .collect();
        for (c, cid) in roster.iter() {
            debug!("new session: candidate {}: {} ({})", cid.0, c.name, c.id);
        }
        Ok(VotingSession {
            roster,
            voter: VoterInfo::default(),
            selected: None,
            has_voted: false,
            pending: None,
            remaining_seconds: countdown_seconds,
            starting_seconds: countdown_seconds,
            tally,
        })
    }

    // **** Accessors ****

    pub fn voter(&self) -> &VoterInfo {
        &self.voter
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.roster.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn selected_candidate(&self) -> Option<&str> {
        self.selected
            .map(|cid| self.candidate(cid).id.as_str())
    }

    pub fn has_voted(&self) -> bool {
        self.has_voted
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn confirmation_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The current counts, in roster order.
    pub fn tally(&self) -> Vec<(String, u64)> {
        self.roster
            .iter()
            .map(|(c, cid)| {
                let count = self.tally.get(cid).cloned().unwrap_or(VoteCount::EMPTY);
                (c.id.clone(), count.0)
            })
            .collect()
    }

    /// A snapshot of everything the rendering layer needs.
    pub fn state(&self) -> SessionState {
        SessionState {
            voter: self.voter.clone(),
            selected_candidate: self.selected_candidate().map(|s| s.to_string()),
            has_voted: self.has_voted,
            remaining_seconds: self.remaining_seconds,
            confirmation_pending: self.pending.is_some(),
        }
    }

    // **** Transitions ****

    /// Sets one voter field. A no-op once the vote is cast or while a
    /// confirmation is outstanding; editing is prevented, not a failure.
    pub fn update_field(&mut self, field: VoterField, value: &str) {
        if self.has_voted || self.pending.is_some() {
            debug!("update_field: ignoring edit of {} while locked", field);
            return;
        }
        self.voter.set_field(field, value);
    }

    /// Selects a candidate by id. Selection may change freely until the vote
    /// is cast; it is a no-op once voted or while a confirmation is
    /// outstanding.
    pub fn select_candidate(&mut self, candidate_id: &str) -> Result<(), SessionErrors> {
        let cid = self.lookup(candidate_id)?;
        if self.has_voted || self.pending.is_some() {
            debug!("select_candidate: ignoring {} while locked", candidate_id);
            return Ok(());
        }
        self.selected = Some(cid);
        Ok(())
    }

    /// True iff all four voter fields are non-empty after trimming, a
    /// candidate is selected, and no vote has been cast yet.
    pub fn can_submit(&self) -> bool {
        self.voter.is_complete() && self.selected.is_some() && !self.has_voted
    }

    /// First phase of the submission. Checks the preconditions and, when they
    /// hold, issues a confirmation request naming the selected candidate and
    /// marks the session pending. The tally is untouched until the request is
    /// resolved.
    pub fn submit(&mut self) -> Result<ConfirmationRequest, SessionErrors> {
        if self.has_voted {
            return Err(SessionErrors::AlreadyVoted);
        }
        if self.pending.is_some() {
            // A second submit while the first confirmation is still
            // outstanding. Rejected as a duplicate request.
            return Err(SessionErrors::AlreadyPending);
        }
        if !self.can_submit() {
            return Err(SessionErrors::IncompleteSubmission(MissingInput {
                fields: self.voter.missing_fields(),
                candidate: self.selected.is_none(),
            }));
        }
        // can_submit() guarantees a selection at this point.
        let cid = self.selected.ok_or(SessionErrors::IncompleteSubmission(
            MissingInput {
                fields: vec![],
                candidate: true,
            },
        ))?;
        let candidate = self.candidate(cid).clone();
        self.pending = Some(cid);
        debug!("submit: confirmation requested for {}", candidate.id);
        Ok(ConfirmationRequest {
            message: format!("Submit the vote for {}?", candidate.name),
            candidate,
        })
    }

    /// Second phase of the submission. Declined requests drop back to the
    /// editable state with no other change; accepted requests commit the vote
    /// and freeze the session.
    pub fn resolve_confirmation(
        &mut self,
        accepted: bool,
    ) -> Result<SubmitOutcome, SessionErrors> {
        let cid = self.pending.take().ok_or(SessionErrors::NoPendingVote)?;
        if !accepted {
            debug!("resolve_confirmation: declined, back to editable");
            return Ok(SubmitOutcome::Declined);
        }
        if let Some(count) = self.tally.get_mut(&cid) {
            *count += VoteCount(1);
        }
        self.has_voted = true;
        let candidate = self.candidate(cid).clone();
        info!(
            "vote recorded for {} by {} ({})",
            candidate.id,
            self.voter.name.trim(),
            self.voter.id.trim()
        );
        Ok(SubmitOutcome::Recorded(VoteReceipt {
            voter_name: self.voter.name.clone(),
            voter_id: self.voter.id.clone(),
            candidate,
        }))
    }

    /// Runs the complete submission through the confirmation collaborator.
    pub fn submit_with(
        &mut self,
        prompt: &mut dyn ConfirmVote,
    ) -> Result<SubmitOutcome, SessionErrors> {
        let request = self.submit()?;
        let accepted = prompt.confirm(&request.message);
        self.resolve_confirmation(accepted)
    }

    /// Reinitializes the voter fields, the selection, the submit-once flag
    /// and the countdown, and cancels any outstanding confirmation. The tally
    /// is preserved.
    pub fn reset(&mut self) {
        debug!("reset: back to the starting state, tally preserved");
        self.voter = VoterInfo::default();
        self.selected = None;
        self.has_voted = false;
        self.pending = None;
        self.remaining_seconds = self.starting_seconds;
    }

    /// One countdown step. A no-op once the vote is cast or at zero; the
    /// counter never goes negative. Reaching zero has no side effect beyond
    /// display.
    pub fn tick(&mut self) {
        if self.has_voted || self.remaining_seconds == 0 {
            return;
        }
        self.remaining_seconds -= 1;
    }

    // **** Internals ****

    fn lookup(&self, candidate_id: &str) -> Result<CandidateId, SessionErrors> {
        self.roster
            .iter()
            .find(|(c, _)| c.id == candidate_id)
            .map(|(_, cid)| *cid)
            .ok_or_else(|| SessionErrors::UnknownCandidate(candidate_id.to_string()))
    }

    fn candidate(&self, cid: CandidateId) -> &Candidate {
        // The roster is fixed at construction, every issued id resolves.
        &self.roster[(cid.0 - 1) as usize].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Answer(bool);

    impl ConfirmVote for Answer {
        fn confirm(&mut self, _message: &str) -> bool {
            self.0
        }
    }

    /// Records the prompt so the tests can check its content.
    struct Recording {
        accept: bool,
        seen: Vec<String>,
    }

    impl ConfirmVote for Recording {
        fn confirm(&mut self, message: &str) -> bool {
            self.seen.push(message.to_string());
            self.accept
        }
    }

    fn roster() -> Vec<Candidate> {
        vec![
            Candidate {
                id: "c1".to_string(),
                name: "CALON 1: ARYA DWI NUGRAHA".to_string(),
            },
            Candidate {
                id: "c2".to_string(),
                name: "CALON 2: RIFQI BANTEEKA".to_string(),
            },
        ]
    }

    fn session() -> VotingSession {
        let _ = env_logger::builder().is_test(true).try_init();
        VotingSession::new(&roster(), DEFAULT_COUNTDOWN_SECONDS).unwrap()
    }

    fn fill(s: &mut VotingSession) {
        s.update_field(VoterField::Name, "Budi");
        s.update_field(VoterField::Id, "12345");
        s.update_field(VoterField::Faculty, "Sains");
        s.update_field(VoterField::Program, "Informatika");
    }

    #[test]
    fn roster_must_have_two_candidates() {
        let one = &roster()[..1];
        assert_eq!(
            VotingSession::new(one, 80).err(),
            Some(SessionErrors::InvalidRoster(1))
        );
        let mut three = roster();
        three.push(Candidate {
            id: "c3".to_string(),
            name: "CALON 3".to_string(),
        });
        assert_eq!(
            VotingSession::new(&three, 80).err(),
            Some(SessionErrors::InvalidRoster(3))
        );
    }

    #[test]
    fn can_submit_needs_all_fields_and_a_selection() {
        let mut s = session();
        assert!(!s.can_submit());
        fill(&mut s);
        // All fields filled but no selection yet.
        assert!(!s.can_submit());
        s.select_candidate("c1").unwrap();
        assert!(s.can_submit());

        // Whitespace-only content does not count as filled.
        s.update_field(VoterField::Faculty, "   ");
        assert!(!s.can_submit());
        s.update_field(VoterField::Faculty, "Sains");
        assert!(s.can_submit());
    }

    #[test]
    fn selection_changes_freely_before_voting() {
        let mut s = session();
        s.select_candidate("c1").unwrap();
        assert_eq!(s.selected_candidate(), Some("c1"));
        s.select_candidate("c2").unwrap();
        assert_eq!(s.selected_candidate(), Some("c2"));
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.select_candidate("c9").err(),
            Some(SessionErrors::UnknownCandidate("c9".to_string()))
        );
        assert_eq!(s.selected_candidate(), None);
    }

    #[test]
    fn incomplete_submission_names_what_is_missing() {
        let mut s = session();
        fill(&mut s);
        s.update_field(VoterField::Name, "");
        s.select_candidate("c1").unwrap();
        match s.submit() {
            Err(SessionErrors::IncompleteSubmission(missing)) => {
                assert_eq!(missing.fields, vec![VoterField::Name]);
                assert!(!missing.candidate);
                assert_eq!(missing.to_string(), "fill in: name");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // No state change.
        assert_eq!(s.tally(), vec![("c1".to_string(), 0), ("c2".to_string(), 0)]);
        assert!(!s.has_voted());
        assert!(!s.confirmation_pending());
    }

    #[test]
    fn incomplete_submission_reports_the_missing_selection() {
        let mut s = session();
        match s.submit() {
            Err(SessionErrors::IncompleteSubmission(missing)) => {
                assert_eq!(missing.fields.len(), 4);
                assert!(missing.candidate);
                assert_eq!(
                    missing.to_string(),
                    "fill in: name, id, faculty, program; choose one of the candidates"
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn confirmed_submission_records_exactly_one_vote() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        let mut prompt = Recording {
            accept: true,
            seen: vec![],
        };
        let outcome = s.submit_with(&mut prompt).unwrap();
        match outcome {
            SubmitOutcome::Recorded(receipt) => {
                assert_eq!(receipt.voter_name, "Budi");
                assert_eq!(receipt.voter_id, "12345");
                assert_eq!(receipt.candidate.id, "c1");
                assert_eq!(receipt.message(), "The choice by Budi (12345) has been recorded.");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            prompt.seen,
            vec!["Submit the vote for CALON 1: ARYA DWI NUGRAHA?".to_string()]
        );
        assert_eq!(s.tally(), vec![("c1".to_string(), 1), ("c2".to_string(), 0)]);
        assert!(s.has_voted());
        assert_eq!(s.selected_candidate(), Some("c1"));
    }

    #[test]
    fn declined_confirmation_changes_nothing() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        let outcome = s.submit_with(&mut Answer(false)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Declined);
        assert_eq!(s.tally(), vec![("c1".to_string(), 0), ("c2".to_string(), 0)]);
        assert!(!s.has_voted());
        // The selection survives the cancellation.
        assert_eq!(s.selected_candidate(), Some("c1"));
        assert!(s.can_submit());
    }

    #[test]
    fn second_submit_after_voting_is_already_voted() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit_with(&mut Answer(true)).unwrap();
        assert_eq!(s.submit().err(), Some(SessionErrors::AlreadyVoted));
        // Even through the full driver, the tally never moves again.
        assert_eq!(
            s.submit_with(&mut Answer(true)).err(),
            Some(SessionErrors::AlreadyVoted)
        );
        assert_eq!(s.tally(), vec![("c1".to_string(), 1), ("c2".to_string(), 0)]);
    }

    #[test]
    fn duplicate_submit_while_pending_is_rejected() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c2").unwrap();
        let request = s.submit().unwrap();
        assert_eq!(request.candidate.id, "c2");
        assert!(s.confirmation_pending());
        // Re-entrant submit while the confirmation is outstanding.
        assert_eq!(s.submit().err(), Some(SessionErrors::AlreadyPending));
        // The original request still resolves and counts once.
        let outcome = s.resolve_confirmation(true).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
        assert_eq!(s.tally(), vec![("c1".to_string(), 0), ("c2".to_string(), 1)]);
    }

    #[test]
    fn resolve_without_a_request_is_an_error() {
        let mut s = session();
        assert_eq!(
            s.resolve_confirmation(true).err(),
            Some(SessionErrors::NoPendingVote)
        );
        assert_eq!(
            s.resolve_confirmation(false).err(),
            Some(SessionErrors::NoPendingVote)
        );
    }

    #[test]
    fn edits_are_ignored_while_a_confirmation_is_outstanding() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit().unwrap();
        s.update_field(VoterField::Name, "Someone else");
        s.select_candidate("c2").unwrap();
        assert_eq!(s.voter().name, "Budi");
        assert_eq!(s.selected_candidate(), Some("c1"));
    }

    #[test]
    fn edits_are_ignored_once_voted() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit_with(&mut Answer(true)).unwrap();
        s.update_field(VoterField::Name, "Someone else");
        s.select_candidate("c2").unwrap();
        assert_eq!(s.voter().name, "Budi");
        assert_eq!(s.selected_candidate(), Some("c1"));
    }

    #[test]
    fn reset_restores_the_start_but_keeps_the_tally() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.tick();
        s.tick();
        s.submit_with(&mut Answer(true)).unwrap();
        s.reset();

        let state = s.state();
        assert_eq!(state.voter, VoterInfo::default());
        assert_eq!(state.selected_candidate, None);
        assert!(!state.has_voted);
        assert!(!state.confirmation_pending);
        assert_eq!(state.remaining_seconds, DEFAULT_COUNTDOWN_SECONDS);
        // The tally survives the reset.
        assert_eq!(s.tally(), vec![("c1".to_string(), 1), ("c2".to_string(), 0)]);
    }

    #[test]
    fn reset_cancels_an_outstanding_confirmation() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit().unwrap();
        s.reset();
        assert!(!s.confirmation_pending());
        assert_eq!(
            s.resolve_confirmation(true).err(),
            Some(SessionErrors::NoPendingVote)
        );
        assert_eq!(s.tally(), vec![("c1".to_string(), 0), ("c2".to_string(), 0)]);
    }

    #[test]
    fn a_new_ballot_after_reset_keeps_counting() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit_with(&mut Answer(true)).unwrap();
        s.reset();

        s.update_field(VoterField::Name, "Sari");
        s.update_field(VoterField::Id, "67890");
        s.update_field(VoterField::Faculty, "Sains");
        s.update_field(VoterField::Program, "Matematika");
        s.select_candidate("c2").unwrap();
        s.submit_with(&mut Answer(true)).unwrap();

        assert_eq!(s.tally(), vec![("c1".to_string(), 1), ("c2".to_string(), 1)]);
    }

    #[test]
    fn tick_stops_at_zero() {
        let mut s = VotingSession::new(&roster(), 2).unwrap();
        s.tick();
        assert_eq!(s.remaining_seconds(), 1);
        s.tick();
        assert_eq!(s.remaining_seconds(), 0);
        s.tick();
        assert_eq!(s.remaining_seconds(), 0);
    }

    #[test]
    fn tick_is_a_noop_once_voted() {
        let mut s = session();
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        s.submit_with(&mut Answer(true)).unwrap();
        let before = s.remaining_seconds();
        s.tick();
        assert_eq!(s.remaining_seconds(), before);
    }

    #[test]
    fn countdown_expiry_does_not_lock_the_session() {
        let mut s = VotingSession::new(&roster(), 1).unwrap();
        s.tick();
        assert_eq!(s.remaining_seconds(), 0);
        fill(&mut s);
        s.select_candidate("c1").unwrap();
        // Expiry is display-only: the vote can still be cast.
        let outcome = s.submit_with(&mut Answer(true)).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
        assert_eq!(s.tally(), vec![("c1".to_string(), 1), ("c2".to_string(), 0)]);
    }
}
