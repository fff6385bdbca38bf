// Copyright 2022 Jeremy Wall
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
//! Recipe collection controller: the displayed list, the query mode, the
//! open dialog and the shopping cart, kept consistent as messages and server
//! responses arrive.
pub mod api;
pub mod app_state;
pub mod cart;
pub mod debounce;
pub mod store;

pub use api::HttpStore;
pub use app_state::{execute, AppState, Command, Dialog, FetchTicket, Message, Mode, StateMachine};
pub use cart::CartSelection;
pub use debounce::SearchDebouncer;
pub use store::{Error, ImageUpload, RecipeStore};
