/// Router Module Index
///
/// Splits the gate's endpoints by what they need from the caller.

/// Routes that need no session at all (liveness, the login flow's marker).
pub mod public;

/// Per-tab shell lifecycle. Each handler resolves the session itself and never rejects,
/// so an anonymous tab still gets the public shell.
pub mod shell;

/// Permission queries for navigation UI.
pub mod access;
