// Copyright 2021 Jeremy Wall
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
use std::path::PathBuf;

use thiserror::Error;

use recipes::{Category, RecipeForm, RecipeId, ValidationError};

pub const HELP: &str = "\
commands:
  all                       show every recipe
  search <text>             search titles and ingredients (waits for typing to pause)
  find <text>               search right away
  category <tag>            filter by category, again to turn the filter off
  show                      redraw the gallery
  view <id>                 show one recipe
  add <title> | <ingredients> | <steps> | <categories> | <tried> [| <image>]
  edit <id>                 open the edit dialog for a recipe
  save <title> | <ingredients> | <steps> | <categories> | <tried> [| <image>]
  delete <id>               open the delete dialog for a recipe
  confirm                   confirm the open delete dialog
  cancel                    close the open dialog
  cart <id>                 add or remove a recipe from the cart
  uncart <id>               remove a recipe from the cart
  basket                    open or close the cart panel
  shop                      print the shopping list for the cart
  help                      this text
  quit";

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a recipe id")]
    BadId(String),
    #[error("expected `title | ingredients | steps | categories | tried [| image]`")]
    BadForm,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// One line of user input.
#[derive(Debug, PartialEq)]
pub enum Input {
    Nothing,
    All,
    Search(String),
    Find(String),
    Category(Category),
    Show,
    View(RecipeId),
    Add(RecipeForm, Option<PathBuf>),
    Edit(RecipeId),
    Save(RecipeForm, Option<PathBuf>),
    Delete(RecipeId),
    Confirm,
    Cancel,
    Cart(RecipeId),
    Uncart(RecipeId),
    Basket,
    Shop,
    Help,
    Quit,
}

fn id_arg(cmd: &'static str, arg: &str) -> Result<RecipeId, CliError> {
    if arg.is_empty() {
        return Err(CliError::MissingArgument(cmd));
    }
    arg.parse().map_err(|_| CliError::BadId(arg.to_owned()))
}

fn tried_arg(arg: &str) -> Result<bool, CliError> {
    match arg.trim().to_lowercase().as_str() {
        "" | "0" | "n" | "no" | "false" => Ok(false),
        "1" | "y" | "yes" | "true" | "tried" => Ok(true),
        _ => Err(CliError::BadForm),
    }
}

/// Escape a form field so `|` and `\` survive [`form_arg`].
pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if c == '|' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Split on unescaped `|`. A backslash escapes `|` and itself, any other
// backslash is kept as is.
fn split_fields(arg: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = arg.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('|') | Some('\\')) => {
                if let (Some(part), Some(next)) = (parts.last_mut(), chars.next()) {
                    part.push(next);
                }
            }
            '|' => parts.push(String::new()),
            c => {
                if let Some(part) = parts.last_mut() {
                    part.push(c);
                }
            }
        }
    }
    parts.iter().map(|p| p.trim().to_owned()).collect()
}

/// Parse the `|` separated recipe form. The form is not validated here.
pub fn form_arg(arg: &str) -> Result<(RecipeForm, Option<PathBuf>), CliError> {
    let parts = split_fields(arg);
    if parts.len() < 5 || parts.len() > 6 {
        return Err(CliError::BadForm);
    }
    let form = RecipeForm {
        title: parts[0].clone(),
        ingredients: parts[1].clone(),
        steps: parts[2].clone(),
        categories: parts[3].clone(),
        tried: tried_arg(&parts[4])?,
    };
    let image = parts
        .get(5)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    Ok((form, image))
}

pub fn parse_input(line: &str) -> Result<Input, CliError> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    Ok(match cmd {
        "" => Input::Nothing,
        "all" => Input::All,
        // An empty search is a valid input, it clears the search.
        "search" => Input::Search(arg.to_owned()),
        "find" => Input::Find(arg.to_owned()),
        "category" => {
            if arg.is_empty() {
                return Err(CliError::MissingArgument("category"));
            }
            Input::Category(arg.parse()?)
        }
        "show" | "ls" => Input::Show,
        "view" => Input::View(id_arg("view", arg)?),
        "add" => {
            let (form, image) = form_arg(arg)?;
            Input::Add(form, image)
        }
        "edit" => Input::Edit(id_arg("edit", arg)?),
        "save" => {
            let (form, image) = form_arg(arg)?;
            Input::Save(form, image)
        }
        "delete" | "rm" => Input::Delete(id_arg("delete", arg)?),
        "confirm" => Input::Confirm,
        "cancel" => Input::Cancel,
        "cart" => Input::Cart(id_arg("cart", arg)?),
        "uncart" => Input::Uncart(id_arg("uncart", arg)?),
        "basket" => Input::Basket,
        "shop" => Input::Shop,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(CliError::UnknownCommand(other.to_owned())),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_input("  "), Ok(Input::Nothing));
        assert_eq!(parse_input("all"), Ok(Input::All));
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
        assert_eq!(parse_input("cart 4"), Ok(Input::Cart(RecipeId(4))));
        assert_eq!(parse_input("delete 12"), Ok(Input::Delete(RecipeId(12))));
    }

    #[test]
    fn test_search_keeps_spaces_inside_query() {
        assert_eq!(
            parse_input("search  paneer tikka "),
            Ok(Input::Search("paneer tikka".to_owned()))
        );
        assert_eq!(parse_input("search"), Ok(Input::Search(String::new())));
    }

    #[test]
    fn test_category_argument() {
        assert_eq!(
            parse_input("category Non-Veg"),
            Ok(Input::Category(Category::NonVeg))
        );
        assert_eq!(
            parse_input("category"),
            Err(CliError::MissingArgument("category"))
        );
        assert_eq!(
            parse_input("category dessert"),
            Err(CliError::Invalid(ValidationError::UnknownCategory(
                "dessert".to_owned()
            )))
        );
    }

    #[test]
    fn test_bad_ids() {
        assert_eq!(parse_input("edit"), Err(CliError::MissingArgument("edit")));
        assert_eq!(
            parse_input("view dal"),
            Err(CliError::BadId("dal".to_owned()))
        );
    }

    #[test]
    fn test_add_form() {
        let input = parse_input("add Dal | toor dal, ghee | boil it | veg, dinner | yes | dal.png");
        let expected = RecipeForm {
            title: "Dal".to_owned(),
            ingredients: "toor dal, ghee".to_owned(),
            steps: "boil it".to_owned(),
            categories: "veg, dinner".to_owned(),
            tried: true,
        };
        assert_eq!(input, Ok(Input::Add(expected, Some(PathBuf::from("dal.png")))));
    }

    #[test]
    fn test_save_form_without_image() {
        match parse_input("save Poha | poha | | breakfast | no") {
            Ok(Input::Save(form, None)) => {
                assert_eq!(form.title, "Poha");
                assert!(!form.tried);
                assert!(form.steps.is_empty());
            }
            res => {
                assert!(false, "{:?}", res);
            }
        }
    }

    #[test]
    fn test_form_needs_all_fields() {
        assert_eq!(parse_input("add Dal | dal"), Err(CliError::BadForm));
        assert_eq!(
            parse_input("add Dal | dal | boil | veg | maybe"),
            Err(CliError::BadForm)
        );
    }

    #[test]
    fn test_escaped_bars_stay_in_their_field() {
        let (form, image) =
            form_arg(r"Dal \| Rice | dal, rice | boil \\ stir | veg | no").expect("valid form");
        assert_eq!(form.title, "Dal | Rice");
        assert_eq!(form.steps, r"boil \ stir");
        assert_eq!(image, None);
        // A lone backslash is not an escape.
        let (form, _) = form_arg(r"C:\dal | dal | | veg | no").expect("valid form");
        assert_eq!(form.title, r"C:\dal");
    }

    #[test]
    fn test_escape_field_round_trips() {
        let title = r"Dal | Rice \ Ghee";
        let line = format!("{} | dal | | veg | no", escape_field(title));
        let (form, _) = form_arg(&line).expect("valid form");
        assert_eq!(form.title, title);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_input("bake 3"),
            Err(CliError::UnknownCommand("bake".to_owned()))
        );
    }
}
