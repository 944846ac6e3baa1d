// Copyright 2025 Johann Kempter
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
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # deepcopy
//!
//! Structural deep copying of dynamically-typed value graphs.
//!
//! Given a value of any supported shape (primitive, fixed-size array, dynamic sequence,
//! mapping, reference or record), `deepcopy` produces a fully independent copy: mutating the
//! copy never affects the original, including through nested or shared containers. References
//! that point to the same target in the original point to the same newly allocated target in
//! the copy, and cyclic graphs copy without looping.
//!
//! ## Features
//!
//! - **Aliasing preservation** - A shared node is copied once and stays shared
//! - **Cycle safety** - Reference cycles terminate through the aliasing tracker
//! - **Closed shape dispatch** - One copier per shape, exhaustive matching, typed errors
//! - **Visibility aware** - Private record fields are skipped and zeroed in the copy
//! - **Thread safe heap** - Independent copies can run in parallel against one [`Heap`]
//!
//! ## Quick Start
//!
//! ```rust
//! use deepcopy::prelude::*;
//!
//! let point = RecordType::builder("Point")
//!     .exported("X", TypeDesc::I64)
//!     .exported("Y", TypeDesc::I64)
//!     .private("cache", TypeDesc::I64)
//!     .build();
//!
//! let heap = Heap::default();
//! let original = RecordValue::new(&point)?
//!     .with("X", 1_i64)?
//!     .with("cache", 99_i64)?;
//! let shared = heap.alloc_reference(TypeDesc::Record(point.clone()), original.into())?;
//! let pair = heap.alloc_sequence(
//!     TypeDesc::reference(TypeDesc::Record(point)),
//!     vec![shared.clone(), shared],
//! )?;
//!
//! let copied = copy(&heap, &pair)?;
//! let cells = copied.as_sequence().and_then(SequenceValue::handle).unwrap();
//! let elements = heap.sequence_elements(cells)?;
//!
//! // Both slots still share one target, which is a new cell
//! assert_eq!(elements[0], elements[1]);
//! # Ok::<(), deepcopy::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`value`] - [`Value`], its [`Kind`] and [`Shape`], and the [`TypeDesc`] / [`RecordType`]
//!   descriptors
//! - [`heap`] - The [`Heap`] arena holding everything that has identity
//! - [`copy`](mod@copy) - Shape dispatch, the aliasing tracker and the per-shape copiers
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: one `debug` record per top-level copy and a
//! `trace` record whenever an aliased reference reuses an existing copy. No logger is installed.

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

pub mod copy;
pub mod heap;
pub mod value;

/// `deepcopy` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `deepcopy` Error type
///
/// See [`error::Error`](crate::Error) for the error categories.
pub use error::Error;

pub use copy::{copy, copy_all, must_copy, CopyContext};
pub use heap::{Heap, HeapRef};
pub use value::{Kind, RecordType, Shape, TypeDesc, Value};
