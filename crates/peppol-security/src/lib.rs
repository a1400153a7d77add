#![forbid(unsafe_code)]

//! Trust policy for SMP lookups: which CA issuer names are acceptable
//! for which service role under a given operating mode, plus the small
//! amount of X.509 name plumbing callers need to apply the policy.
//!
//! Signature verification says "this document is intact and was signed
//! by the holder of this certificate"; this crate answers the separate
//! question "is that certificate's issuer one we trust here".

pub mod cert;
pub mod mode;

pub use cert::{issuer_common_name, issuer_matches, subject_common_name};
pub use mode::{Mode, ModeDescription, Service};
