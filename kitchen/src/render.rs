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
use std::fmt::Write;

use kitchen_web::{AppState, Dialog, Mode};
use recipes::{Category, Recipe, RecipeForm};

use crate::cli::escape_field;

/// Resolve a stored image reference against the image base url. Absolute
/// urls are returned as is.
pub fn resolve_image(base: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}

fn categories(recipe: &Recipe) -> String {
    recipe
        .category
        .iter()
        .map(|c| match c.parse::<Category>() {
            Ok(cat) => cat.display_name(),
            // Server data is shown as is.
            Err(_) => c.clone(),
        })
        .collect::<Vec<String>>()
        .join(", ")
}

fn mode_line(mode: &Mode) -> String {
    match mode {
        Mode::Unfiltered => "All recipes".to_owned(),
        Mode::TextSearch(q) => format!("Search: \"{}\"", q),
        Mode::CategoryFilter(c) => format!("Category: {}", c.display_name()),
    }
}

/// The gallery, the dialog line, the cart panel and any error.
pub fn render_state(state: &AppState) -> String {
    let mut out = String::new();
    let _ = write!(out, "== {}", mode_line(&state.mode));
    if state.loading {
        out.push_str(" (loading)");
    }
    out.push('\n');
    if state.recipes.is_empty() {
        out.push_str("   no recipes\n");
    }
    for r in state.recipes.iter() {
        let marker = if state.cart.contains(r.id) { '*' } else { ' ' };
        let _ = write!(out, " {} [{}] {}", marker, r.id, r.title);
        if !r.category.is_empty() {
            let _ = write!(out, " ({})", categories(r));
        }
        if r.tried {
            out.push_str(" - tried");
        }
        out.push('\n');
    }
    match (state.dialog, state.selected_recipe()) {
        (Dialog::None, _) => (),
        (Dialog::Add, _) => out.push_str("-- adding a recipe, `add ...` to submit, `cancel` to close\n"),
        (Dialog::Edit, Some(r)) => {
            let _ = writeln!(out, "-- editing [{}] {}, `save ...` to submit, `cancel` to close", r.id, r.title);
        }
        (Dialog::Delete, Some(r)) => {
            let _ = writeln!(out, "-- delete [{}] {}? `confirm` or `cancel`", r.id, r.title);
        }
        (dialog, None) => {
            let _ = writeln!(out, "-- {:?} dialog open", dialog);
        }
    }
    if state.saving {
        out.push_str("-- saving...\n");
    }
    let items = state.cart_items();
    if state.cart_open {
        let _ = writeln!(out, "-- cart: {} items added", items.len());
        for r in items.iter() {
            let _ = writeln!(out, "     [{}] {}", r.id, r.title);
        }
    } else if !items.is_empty() {
        let _ = writeln!(out, "-- {} items added, `basket` to view cart", items.len());
    }
    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "!! {}", err);
    }
    out
}

/// Detail view for one recipe.
pub fn render_recipe(recipe: &Recipe, image_base: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", recipe.title);
    let _ = writeln!(out, "Category: {}", categories(recipe));
    let _ = writeln!(out, "Ingredients: {}", recipe.ingredients.join(", "));
    let _ = writeln!(out, "Steps: {}", recipe.steps);
    let _ = writeln!(out, "Tried: {}", if recipe.tried { "Yes" } else { "No" });
    if let Some(image) = &recipe.image {
        let _ = writeln!(out, "Image: {}", resolve_image(image_base, image));
    }
    out
}

/// A form prefilled for `save`.
pub fn render_form(form: &RecipeForm) -> String {
    format!(
        "save {} | {} | {} | {} | {}",
        escape_field(&form.title),
        escape_field(&form.ingredients),
        escape_field(&form.steps.replace('\n', " ")),
        escape_field(&form.categories),
        if form.tried { "yes" } else { "no" }
    )
}

pub fn render_shopping_list(state: &AppState) -> String {
    let items = state.shopping_list();
    if items.is_empty() {
        return "the cart is empty\n".to_owned();
    }
    let mut out = String::new();
    for i in items {
        let _ = writeln!(out, " - {}", i);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    use kitchen_web::FetchTicket;
    use recipes::RecipeId;

    fn state_with(recipes: Vec<Recipe>) -> AppState {
        let mut state = AppState::new();
        let ticket: FetchTicket = state.set_mode(Mode::Unfiltered);
        state.apply_fetch_result(&ticket, recipes);
        state
    }

    #[test]
    fn test_resolve_image() {
        assert_eq!(
            resolve_image("http://localhost:8000/", "/uploads/dal.png"),
            "http://localhost:8000/uploads/dal.png"
        );
        assert_eq!(
            resolve_image("http://localhost:8000", "https://cdn.example.com/dal.png"),
            "https://cdn.example.com/dal.png"
        );
    }

    #[test]
    fn test_render_gallery_marks_cart_items() {
        let mut state = state_with(vec![
            Recipe::new(RecipeId(1), "Dal").with_categories(vec![Category::Veg]),
            Recipe::new(RecipeId(2), "Poha").with_tried(true),
        ]);
        state.cart.toggle(RecipeId(2));
        let out = render_state(&state);
        assert!(out.starts_with("== All recipes\n"), "{}", out);
        assert!(out.contains("   [1] Dal (Veg)\n"), "{}", out);
        assert!(out.contains(" * [2] Poha - tried\n"), "{}", out);
        assert!(out.contains("-- 1 items added"), "{}", out);
    }

    #[test]
    fn test_render_delete_dialog() {
        let mut state = state_with(vec![Recipe::new(RecipeId(7), "Rajma")]);
        state.request_delete(RecipeId(7));
        let out = render_state(&state);
        assert!(out.contains("-- delete [7] Rajma? `confirm` or `cancel`"), "{}", out);
    }

    #[test]
    fn test_render_recipe_detail() {
        let recipe = Recipe::new(RecipeId(3), "Poha")
            .with_ingredients(vec!["poha", "peanuts"])
            .with_categories(vec![Category::Breakfast, Category::NonVeg])
            .with_image("uploads/poha.png");
        let out = render_recipe(&recipe, "http://h");
        assert!(out.contains("Category: Breakfast, Non Veg\n"), "{}", out);
        assert!(out.contains("Ingredients: poha, peanuts\n"), "{}", out);
        assert!(out.contains("Tried: No\n"), "{}", out);
        assert!(out.contains("Image: http://h/uploads/poha.png\n"), "{}", out);
    }

    #[test]
    fn test_render_form_for_editing() {
        let recipe = Recipe::new(RecipeId(3), "Poha")
            .with_ingredients(vec!["poha", "peanuts"])
            .with_steps("Rinse.\nFry.")
            .with_categories(vec![Category::Breakfast]);
        assert_eq!(
            render_form(&RecipeForm::from_recipe(&recipe)),
            "save Poha | poha, peanuts | Rinse. Fry. | breakfast | no"
        );
    }

    #[test]
    fn test_rendered_form_parses_back() {
        let recipe = Recipe::new(RecipeId(4), "Dal | Rice")
            .with_ingredients(vec!["dal", "rice"])
            .with_steps("boil | serve")
            .with_categories(vec![Category::Lunch])
            .with_tried(true);
        let line = render_form(&RecipeForm::from_recipe(&recipe));
        assert_eq!(
            line,
            r"save Dal \| Rice | dal, rice | boil \| serve | lunch | yes"
        );
        match crate::cli::parse_input(&line) {
            Ok(crate::cli::Input::Save(form, None)) => {
                assert_eq!(form.title, "Dal | Rice");
                assert_eq!(form.steps, "boil | serve");
                assert!(form.tried);
            }
            res => assert!(false, "{:?}", res),
        }
    }

    #[test]
    fn test_render_empty_shopping_list() {
        let state = state_with(Vec::new());
        assert_eq!(render_shopping_list(&state), "the cart is empty\n");
    }
}
