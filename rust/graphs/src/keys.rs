// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle types for arena-based storage.
//!
//! Sweep events reference each other (every event knows the event at the
//! other end of its edge). Instead of shared pointers they live in a
//! `slotmap::SlotMap` and point at each other through these generational
//! keys, so rewriting a pair is a single write into the arena.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a sweep event inside one sweep-line run.
    pub struct SweepEventKey;
}
