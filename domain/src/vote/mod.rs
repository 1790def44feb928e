//! Advisory votes
//!
//! A vote polls a closed set of participants (those present when it was
//! called) for a position, a rationale and a confidence level. Closing a
//! vote produces a [`VoteTally`]; it never produces a decision. Only the
//! Chair decides.
//!
//! - [`ballot`]: the vote record and individual responses
//! - [`tally`]: grouping of responses by option
//! - [`rule`]: advisory consensus rules used to annotate a tally
//! - [`parsing`]: extraction of a position from a free-text poll reply

pub mod ballot;
pub mod parsing;
pub mod rule;
pub mod tally;

pub use ballot::{Confidence, Position, Vote, VoteId, VoteResponse};
pub use parsing::{VoteReply, parse_vote_reply};
pub use rule::{AdvisoryOutcome, ConsensusRule, RuleParseError};
pub use tally::{TallyGroup, VoteTally};
