//! hostadm core - disk usage reporting, account management, system information.
//!
//! This crate contains all host-administration logic with zero UI dependencies.
//! Every operation delegates the heavy lifting to a standard OS utility
//! (`du`, `find`, `useradd`, `userdel`, `chpasswd`, `getent`, `id`, `tar`,
//! `lsblk`, `findmnt`, `df`, `iostat`) invoked with a structured argument
//! array, then reformats the captured output. Nothing here spawns threads or
//! keeps state between calls.
//!
//! # Modules
//!
//! - [`report`] - the disk-usage report pipeline (collect, filter, sort, render).
//! - [`accounts`] - user account lifecycle wrappers.
//! - [`sysinfo`] - read-only system information passthroughs.

pub mod accounts;
pub mod report;
pub mod sysinfo;
