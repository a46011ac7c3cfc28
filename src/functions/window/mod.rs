// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Window Functions
//!
//! Functions that only make sense inside an OVER clause:
//!
//! - [`LeadFunction`] - LEAD(column, offset, default)
//! - [`LagFunction`] - LAG(column, offset, default)
//! - [`NtileFunction`] - NTILE(n)
//! - [`CumeDistFunction`] - CUME_DIST()
//!
//! NTILE and CUME_DIST are size-sensitive: they read the window size handed
//! over through `set_window_size` and count the rows accumulated so far.

mod cume_dist;
mod lead_lag;
mod ntile;

pub use cume_dist::CumeDistFunction;
pub use lead_lag::{LagFunction, LeadFunction};
pub use ntile::NtileFunction;
