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
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use recipes::{Category, Recipe, RecipeFields, RecipeId};
use tracing::{debug, error, info, instrument, warn};

use crate::cart::{self, CartSelection};
use crate::debounce::SearchDebouncer;
use crate::store::{Error, ImageUpload, RecipeStore};

/// The single active query dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Unfiltered,
    TextSearch(String),
    CategoryFilter(Category),
}

impl Mode {
    /// Blank searches mean "show everything".
    pub fn search<S: AsRef<str>>(query: S) -> Self {
        let query = query.as_ref().trim();
        if query.is_empty() {
            Mode::Unfiltered
        } else {
            Mode::TextSearch(query.to_owned())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    None,
    Add,
    Edit,
    Delete,
}

/// Tag carried by every fetch so its result can be matched against the state
/// that is current when it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub mode: Mode,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub recipes: Vec<Recipe>,
    pub mode: Mode,
    pub selected: Option<RecipeId>,
    pub dialog: Dialog,
    pub cart: CartSelection,
    pub cart_open: bool,
    /// The most recent failure for the caller to report.
    pub last_error: Option<Error>,
    /// A fetch for the current mode is outstanding.
    pub loading: bool,
    /// An add/edit/delete is outstanding.
    pub saving: bool,
    generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            recipes: Vec::new(),
            mode: Mode::Unfiltered,
            selected: None,
            dialog: Dialog::None,
            cart: CartSelection::new(),
            cart_open: false,
            last_error: None,
            loading: false,
            saving: false,
            generation: 0,
        }
    }

    pub fn find(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.selected.and_then(|id| self.find(id))
    }

    pub fn cart_items(&self) -> Vec<&Recipe> {
        self.cart.visible_items(&self.recipes)
    }

    pub fn shopping_list(&self) -> Vec<String> {
        cart::ingredient_manifest(self.cart_items())
    }

    /// Switch the query mode and return the one fetch the new mode needs.
    ///
    /// Selecting the category filter that is already active turns filtering
    /// off. Neither the cart nor any open dialog is touched.
    #[instrument(skip(self), fields(from=?self.mode))]
    pub fn set_mode(&mut self, mode: Mode) -> FetchTicket {
        let mode = match mode {
            Mode::TextSearch(q) => Mode::search(q),
            Mode::CategoryFilter(c) if self.mode == Mode::CategoryFilter(c) => Mode::Unfiltered,
            mode => mode,
        };
        self.generation += 1;
        self.mode = mode.clone();
        self.loading = true;
        debug!(?mode, generation = self.generation, "issuing fetch");
        FetchTicket {
            mode,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.mode == self.mode && ticket.generation == self.generation
    }

    /// Replace the recipe list with `data` if `ticket` is still the latest
    /// fetch for the current mode. Returns whether it was applied.
    pub fn apply_fetch_result(&mut self, ticket: &FetchTicket, data: Vec<Recipe>) -> bool {
        if !self.is_current(ticket) {
            debug!(?ticket, current=?self.mode, "discarding stale fetch result");
            return false;
        }
        self.recipes = data;
        self.loading = false;
        self.last_error = None;
        true
    }

    /// Record a failed fetch. The previously displayed list stays.
    pub fn fetch_failed(&mut self, ticket: &FetchTicket, err: Error) -> bool {
        if !self.is_current(ticket) {
            debug!(?ticket, ?err, "ignoring failure of a stale fetch");
            return false;
        }
        warn!(?err, mode=?self.mode, "fetch failed, keeping last good list");
        self.loading = false;
        self.last_error = Some(err);
        true
    }

    fn open(&mut self, dialog: Dialog, selected: Option<RecipeId>) -> bool {
        if self.dialog != Dialog::None {
            debug!(open=?self.dialog, requested=?dialog, "a dialog is already open");
            return false;
        }
        self.dialog = dialog;
        self.selected = selected;
        self.last_error = None;
        true
    }

    pub fn open_add(&mut self) -> bool {
        self.open(Dialog::Add, None)
    }

    /// Target `id` with the edit dialog. No-op if the recipe is gone.
    pub fn request_edit(&mut self, id: RecipeId) -> bool {
        if self.find(id).is_none() {
            debug!(%id, "edit requested for a recipe that is not displayed");
            return false;
        }
        self.open(Dialog::Edit, Some(id))
    }

    /// Target `id` with the delete dialog. No-op if the recipe is gone.
    pub fn request_delete(&mut self, id: RecipeId) -> bool {
        if self.find(id).is_none() {
            debug!(%id, "delete requested for a recipe that is not displayed");
            return false;
        }
        self.open(Dialog::Delete, Some(id))
    }

    /// Cancel whatever dialog is open. An outstanding save still lands.
    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
        self.selected = None;
    }

    fn close_if(&mut self, dialog: Dialog, id: Option<RecipeId>) {
        if self.dialog == dialog && (id.is_none() || self.selected == id) {
            self.close_dialog();
        }
    }

    pub fn commit_add(&mut self, recipe: Recipe) {
        match self.recipes.iter_mut().find(|r| r.id == recipe.id) {
            // A list fetch may have raced us to it.
            Some(existing) => *existing = recipe,
            None => self.recipes.push(recipe),
        }
        self.saving = false;
        self.last_error = None;
        self.close_if(Dialog::Add, None);
    }

    pub fn commit_edit(&mut self, recipe: Recipe) {
        let id = recipe.id;
        match self.recipes.iter_mut().find(|r| r.id == id) {
            Some(existing) => *existing = recipe,
            None => debug!(%id, "edited recipe is no longer displayed"),
        }
        self.saving = false;
        self.last_error = None;
        self.close_if(Dialog::Edit, Some(id));
    }

    /// Remove `id` everywhere. An edit dialog on the same recipe closes too.
    pub fn commit_delete(&mut self, id: RecipeId) {
        self.recipes.retain(|r| r.id != id);
        self.cart.remove(id);
        self.saving = false;
        self.last_error = None;
        self.close_if(Dialog::Delete, Some(id));
        self.close_if(Dialog::Edit, Some(id));
    }

    /// A save failed. Everything stays as it was, including the open dialog.
    pub fn mutation_failed(&mut self, err: Error) {
        error!(?err, dialog=?self.dialog, "recipe update failed");
        self.saving = false;
        self.last_error = Some(err);
    }
}

/// Everything the presentation layer can ask of the controller, plus the
/// completions of the commands it hands back.
#[derive(Debug)]
pub enum Message {
    /// Initial load or an explicit refresh of the current mode.
    Refresh,
    ShowAll,
    /// The search box changed. Debounced.
    SearchInput { query: String, at: Instant },
    /// The search was submitted. Not debounced.
    Search(String),
    /// Time passed. Fires a due debounced search.
    Tick(Instant),
    SelectCategory(Category),
    Fetched(FetchTicket, Result<Vec<Recipe>, Error>),
    OpenAdd,
    RequestEdit(RecipeId),
    RequestDelete(RecipeId),
    CloseDialog,
    SubmitAdd(RecipeFields, Option<ImageUpload>),
    SubmitEdit(RecipeFields, Option<ImageUpload>),
    ConfirmDelete,
    Created(Result<Recipe, Error>),
    Updated(RecipeId, Result<Recipe, Error>),
    Deleted(RecipeId, Result<(), Error>),
    ToggleCart(RecipeId),
    RemoveFromCart(RecipeId),
    ToggleCartPanel,
}

/// Work for a `RecipeStore`. Run it with [`execute`] and feed the returned
/// message back through [`StateMachine::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch(FetchTicket),
    Create(RecipeFields, Option<ImageUpload>),
    Update(RecipeId, RecipeFields, Option<ImageUpload>),
    Delete(RecipeId),
}

pub struct StateMachine {
    state: AppState,
    debouncer: SearchDebouncer,
}

impl StateMachine {
    pub fn new(window: Duration) -> Self {
        Self {
            state: AppState::new(),
            debouncer: SearchDebouncer::new(window),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// When the next `Tick` is due, if a search is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn fetch(&mut self, mode: Mode) -> Option<Command> {
        Some(Command::Fetch(self.state.set_mode(mode)))
    }

    #[instrument(skip_all, fields(?msg))]
    pub fn dispatch(&mut self, msg: Message) -> Option<Command> {
        match msg {
            Message::Refresh => {
                let mode = self.state.mode.clone();
                // Re-issuing the active category would toggle it off.
                self.state.generation += 1;
                self.state.loading = true;
                Some(Command::Fetch(FetchTicket {
                    mode,
                    generation: self.state.generation,
                }))
            }
            Message::ShowAll => {
                self.debouncer.cancel();
                self.fetch(Mode::Unfiltered)
            }
            Message::SearchInput { query, at } => {
                self.debouncer.input(query, at);
                None
            }
            Message::Search(query) => {
                self.debouncer.cancel();
                self.fetch(Mode::search(query))
            }
            Message::Tick(now) => match self.debouncer.poll(now) {
                Some(query) => {
                    info!(%query, "search input settled");
                    self.fetch(Mode::search(query))
                }
                None => None,
            },
            Message::SelectCategory(category) => {
                // The category is the newer intent. A search still waiting on
                // its window would otherwise clobber it.
                if self.debouncer.cancel() {
                    debug!("dropping pending search for category selection");
                }
                self.fetch(Mode::CategoryFilter(category))
            }
            Message::Fetched(ticket, Ok(recipes)) => {
                self.state.apply_fetch_result(&ticket, recipes);
                None
            }
            Message::Fetched(ticket, Err(err)) => {
                self.state.fetch_failed(&ticket, err);
                None
            }
            Message::OpenAdd => {
                self.state.open_add();
                None
            }
            Message::RequestEdit(id) => {
                self.state.request_edit(id);
                None
            }
            Message::RequestDelete(id) => {
                self.state.request_delete(id);
                None
            }
            Message::CloseDialog => {
                self.state.close_dialog();
                None
            }
            Message::SubmitAdd(fields, image) => {
                if self.state.dialog != Dialog::Add || self.state.saving {
                    warn!(dialog=?self.state.dialog, "add submitted without an idle add dialog");
                    return None;
                }
                self.state.saving = true;
                Some(Command::Create(fields, image))
            }
            Message::SubmitEdit(fields, image) => {
                match (self.state.dialog, self.state.selected, self.state.saving) {
                    (Dialog::Edit, Some(id), false) => {
                        self.state.saving = true;
                        Some(Command::Update(id, fields, image))
                    }
                    _ => {
                        warn!(dialog=?self.state.dialog, "edit submitted without an idle edit dialog");
                        None
                    }
                }
            }
            Message::ConfirmDelete => {
                match (self.state.dialog, self.state.selected, self.state.saving) {
                    (Dialog::Delete, Some(id), false) => {
                        self.state.saving = true;
                        Some(Command::Delete(id))
                    }
                    _ => {
                        warn!(dialog=?self.state.dialog, "delete confirmed without an idle delete dialog");
                        None
                    }
                }
            }
            Message::Created(Ok(recipe)) => {
                info!(id=%recipe.id, "recipe created");
                self.state.commit_add(recipe);
                None
            }
            Message::Updated(id, Ok(recipe)) if recipe.id != id => {
                warn!(%id, returned=%recipe.id, "server answered an update with another recipe");
                self.state.mutation_failed(Error::MalformedResponse(format!(
                    "update of recipe {} returned recipe {}",
                    id, recipe.id
                )));
                None
            }
            Message::Updated(_, Ok(recipe)) => {
                self.state.commit_edit(recipe);
                None
            }
            Message::Deleted(id, Ok(())) => {
                info!(%id, "recipe deleted");
                self.state.commit_delete(id);
                None
            }
            Message::Created(Err(err))
            | Message::Updated(_, Err(err))
            | Message::Deleted(_, Err(err)) => {
                self.state.mutation_failed(err);
                None
            }
            Message::ToggleCart(id) => {
                self.state.cart.toggle(id);
                None
            }
            Message::RemoveFromCart(id) => {
                self.state.cart.remove(id);
                None
            }
            Message::ToggleCartPanel => {
                self.state.cart_open = !self.state.cart_open;
                None
            }
        }
    }

    /// Dispatch `msg` and run whatever follows from it to completion, one
    /// command at a time.
    pub async fn handle<S>(&mut self, store: &S, msg: Message)
    where
        S: RecipeStore + ?Sized,
    {
        let mut queue = VecDeque::new();
        queue.extend(self.dispatch(msg));
        while let Some(cmd) = queue.pop_front() {
            let done = execute(store, cmd).await;
            queue.extend(self.dispatch(done));
        }
    }
}

/// Run `cmd` against `store` and produce its completion message.
#[instrument(skip(store))]
pub async fn execute<S>(store: &S, cmd: Command) -> Message
where
    S: RecipeStore + ?Sized,
{
    match cmd {
        Command::Fetch(ticket) => {
            let result = match &ticket.mode {
                Mode::Unfiltered => store.list_all().await,
                Mode::TextSearch(query) => store.search_by_text(query).await,
                Mode::CategoryFilter(category) => store.filter_by_category(*category).await,
            };
            Message::Fetched(ticket, result)
        }
        Command::Create(fields, image) => Message::Created(store.create(fields, image).await),
        Command::Update(id, fields, image) => {
            Message::Updated(id, store.update(id, fields, image).await)
        }
        Command::Delete(id) => Message::Deleted(id, store.delete(id).await),
    }
}
