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
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_std::io::{prelude::BufReadExt, stdin, BufReader};
use async_std::task;
use futures::stream::FuturesUnordered;
use futures::{pin_mut, select, FutureExt, StreamExt};
use tracing::{debug, error, info, instrument};

use kitchen_web::{execute, Dialog, HttpStore, ImageUpload, Message, StateMachine};
use recipes::{RecipeForm, RecipeFields};

use crate::cli::{self, Input};
use crate::render;
use crate::Config;

// How long to sleep when no search is waiting on its window.
const IDLE: Duration = Duration::from_secs(3600);

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = async_std::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_owned());
    Ok(ImageUpload::new(file_name, bytes))
}

/// Validate a submitted form at the boundary and load its image. Invalid
/// input never turns into a message.
async fn prepare(
    form: RecipeForm,
    image: Option<PathBuf>,
) -> anyhow::Result<(RecipeFields, Option<ImageUpload>)> {
    let fields = form.validate()?;
    let image = match image {
        Some(path) => Some(read_image(&path).await?),
        None => None,
    };
    Ok((fields, image))
}

#[derive(Debug)]
enum Step {
    Send(Vec<Message>),
    /// Send, then print once the state has been redrawn.
    SendAndPrint(Vec<Message>, String),
    Print(String),
    Quit,
}

/// Translate a line of input into what the controller should see.
async fn interpret(machine: &StateMachine, config: &Config, line: &str) -> Step {
    let input = match cli::parse_input(line) {
        Ok(input) => input,
        Err(err) => return Step::Print(format!("{}\n", err)),
    };
    let state = machine.state();
    match input {
        Input::Nothing => Step::Print(String::new()),
        Input::All => Step::Send(vec![Message::ShowAll]),
        Input::Search(query) => Step::Send(vec![Message::SearchInput {
            query,
            at: Instant::now(),
        }]),
        Input::Find(query) => Step::Send(vec![Message::Search(query)]),
        Input::Category(category) => Step::Send(vec![Message::SelectCategory(category)]),
        Input::Show => Step::Print(render::render_state(state)),
        Input::View(id) => match state.find(id) {
            Some(recipe) => Step::Print(render::render_recipe(recipe, &config.image_base)),
            None => Step::Print(format!("recipe {} is not displayed\n", id)),
        },
        Input::Add(form, image) => match prepare(form, image).await {
            // The form is the add dialog here so it opens on submit.
            Ok((fields, image)) if state.dialog == Dialog::None => Step::Send(vec![
                Message::OpenAdd,
                Message::SubmitAdd(fields, image),
            ]),
            Ok((fields, image)) => Step::Send(vec![Message::SubmitAdd(fields, image)]),
            Err(err) => Step::Print(format!("{}\n", err)),
        },
        Input::Edit(id) => match state.find(id) {
            // The prefill only makes sense if the dialog is going to open.
            Some(recipe) if state.dialog == Dialog::None => Step::SendAndPrint(
                vec![Message::RequestEdit(id)],
                format!("{}\n", render::render_form(&RecipeForm::from_recipe(recipe))),
            ),
            Some(_) => Step::Print(format!("close the {:?} dialog first\n", state.dialog)),
            None => Step::Print(format!("recipe {} is not displayed\n", id)),
        },
        Input::Save(form, image) => match prepare(form, image).await {
            Ok((fields, image)) => Step::Send(vec![Message::SubmitEdit(fields, image)]),
            Err(err) => Step::Print(format!("{}\n", err)),
        },
        Input::Delete(id) => Step::Send(vec![Message::RequestDelete(id)]),
        Input::Confirm => Step::Send(vec![Message::ConfirmDelete]),
        Input::Cancel => Step::Send(vec![Message::CloseDialog]),
        Input::Cart(id) => Step::Send(vec![Message::ToggleCart(id)]),
        Input::Uncart(id) => Step::Send(vec![Message::RemoveFromCart(id)]),
        Input::Basket => Step::Send(vec![Message::ToggleCartPanel]),
        Input::Shop => Step::Print(render::render_shopping_list(state)),
        Input::Help => Step::Print(format!("{}\n", cli::HELP)),
        Input::Quit => Step::Quit,
    }
}

/// Interactive session. Input, the debounce timer and outstanding store
/// calls are all multiplexed on this one task.
#[instrument(skip_all, fields(api=%config.api_root))]
pub async fn run(store: HttpStore, config: Config) -> anyhow::Result<()> {
    let mut machine = StateMachine::new(config.debounce);
    let store = &store;
    let mut inflight = FuturesUnordered::new();
    inflight.extend(machine.dispatch(Message::Refresh).map(|cmd| execute(store, cmd)));

    let mut lines = BufReader::new(stdin()).lines().fuse();
    println!("{}", cli::HELP);
    loop {
        let wait = machine
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE);
        let timer = task::sleep(wait).fuse();
        pin_mut!(timer);
        let mut trailer = None;
        let msgs = select! {
            line = lines.next() => match line {
                Some(Ok(line)) => match interpret(&machine, &config, &line).await {
                    Step::Send(msgs) => msgs,
                    Step::SendAndPrint(msgs, out) => {
                        trailer = Some(out);
                        msgs
                    }
                    Step::Print(out) => {
                        print!("{}", out);
                        continue;
                    }
                    Step::Quit => break,
                },
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            done = inflight.select_next_some() => vec![done],
            () = timer => vec![Message::Tick(Instant::now())],
        };
        // A quiet tick does not redraw.
        let quiet = matches!(msgs.as_slice(), [Message::Tick(_)]);
        let mut issued = false;
        for msg in msgs {
            if let Some(cmd) = machine.dispatch(msg) {
                debug!(?cmd, "dispatching command");
                inflight.push(execute(store, cmd));
                issued = true;
            }
        }
        if quiet && !issued {
            continue;
        }
        print!("{}", render::render_state(machine.state()));
        if let Some(out) = trailer {
            print!("{}", out);
        }
    }
    info!(outstanding = inflight.len(), "leaving session");
    Ok(())
}

/// Run a single message to completion and print the gallery.
pub async fn once(store: HttpStore, config: Config, msg: Message) -> anyhow::Result<()> {
    let mut machine = StateMachine::new(config.debounce);
    machine.handle(&store, msg).await;
    let state = machine.state();
    print!("{}", render::render_state(state));
    if let Some(err) = &state.last_error {
        error!(?err, "request failed");
        anyhow::bail!("{}", err);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use futures::executor::block_on;
    use kitchen_web::Command;
    use recipes::{Category, Recipe, RecipeId};

    fn config() -> Config {
        Config {
            api_root: "http://localhost:8000".to_owned(),
            image_base: "http://localhost:8000".to_owned(),
            debounce: Duration::from_millis(500),
        }
    }

    fn loaded() -> StateMachine {
        let mut machine = StateMachine::new(Duration::from_millis(500));
        let ticket = match machine.dispatch(Message::Refresh) {
            Some(Command::Fetch(ticket)) => ticket,
            cmd => panic!("expected a fetch, got {:?}", cmd),
        };
        let recipes = vec![
            Recipe::new(RecipeId(1), "Dal").with_ingredients(vec!["dal"]),
            Recipe::new(RecipeId(2), "Poha")
                .with_ingredients(vec!["poha"])
                .with_categories(vec![Category::Breakfast]),
        ];
        machine.dispatch(Message::Fetched(ticket, Ok(recipes)));
        machine
    }

    #[test]
    fn test_edit_prints_prefill_with_the_request() {
        let machine = loaded();
        match block_on(interpret(&machine, &config(), "edit 2")) {
            Step::SendAndPrint(msgs, out) => {
                assert!(matches!(msgs.as_slice(), [Message::RequestEdit(RecipeId(2))]));
                assert_eq!(out, "save Poha | poha |  | breakfast | no\n");
            }
            step => panic!("unexpected step {:?}", step),
        }
    }

    #[test]
    fn test_edit_while_a_dialog_is_open_prints_no_prefill() {
        let mut machine = loaded();
        machine.dispatch(Message::RequestDelete(RecipeId(1)));
        match block_on(interpret(&machine, &config(), "edit 2")) {
            Step::Print(out) => {
                assert_eq!(out, "close the Delete dialog first\n");
                assert!(!out.contains("save"));
            }
            step => panic!("unexpected step {:?}", step),
        }
    }

    #[test]
    fn test_add_opens_the_dialog_before_submitting() {
        let machine = loaded();
        match block_on(interpret(&machine, &config(), "add Rajma | rajma | soak | veg | no")) {
            Step::Send(msgs) => {
                assert!(matches!(
                    msgs.as_slice(),
                    [Message::OpenAdd, Message::SubmitAdd(_, None)]
                ));
            }
            step => panic!("unexpected step {:?}", step),
        }
    }
}
