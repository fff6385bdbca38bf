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
pub mod parse;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use inflector::Inflector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server assigned identifier for a recipe. The client never mints these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(w, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecipeId(s.trim().parse()?))
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        RecipeId(id)
    }
}

/// The fixed vocabulary of category tags a recipe form may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Veg,
    NonVeg,
    Breakfast,
    Lunch,
    Dinner,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Veg,
        Category::NonVeg,
        Category::Breakfast,
        Category::Lunch,
        Category::Dinner,
    ];

    /// The wire tag for this category.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Veg => "veg",
            Category::NonVeg => "non-veg",
            Category::Breakfast => "breakfast",
            Category::Lunch => "lunch",
            Category::Dinner => "dinner",
        }
    }

    /// Human readable label, e.g. `Non Veg`.
    pub fn display_name(&self) -> String {
        self.tag().to_title_case()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        w.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .find(|c| c.tag() == tag)
            .copied()
            .ok_or_else(|| ValidationError::UnknownCategory(s.trim().to_owned()))
    }
}

/// A recipe as the server last reported it.
///
/// Categories are kept as the raw strings the server sent. The vocabulary is
/// only enforced when a form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: String,
    pub category: Vec<String>,
    pub image: Option<String>,
    pub tried: bool,
}

impl Recipe {
    pub fn new<S: Into<String>>(id: RecipeId, title: S) -> Self {
        Self {
            id,
            title: title.into(),
            ingredients: Vec::new(),
            steps: String::new(),
            category: Vec::new(),
            image: None,
            tried: false,
        }
    }

    pub fn with_ingredients<Iter, S>(mut self, ingredients: Iter) -> Self
    where
        Iter: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .extend(ingredients.into_iter().map(|i| i.into()));
        self
    }

    pub fn with_steps<S: Into<String>>(mut self, steps: S) -> Self {
        self.steps = steps.into();
        self
    }

    pub fn with_categories<Iter>(mut self, categories: Iter) -> Self
    where
        Iter: IntoIterator<Item = Category>,
    {
        self.category
            .extend(categories.into_iter().map(|c| c.tag().to_owned()));
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_tried(mut self, tried: bool) -> Self {
        self.tried = tried;
        self
    }

    /// True if any of the server reported categories matches `category`.
    pub fn has_category(&self, category: Category) -> bool {
        self.category
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(category.tag()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a recipe needs a title")]
    MissingTitle,
    #[error("a recipe needs at least one ingredient")]
    MissingIngredients,
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
}

/// The raw contents of the add/edit recipe form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub title: String,
    /// Comma separated ingredients, e.g. `chopped-onions, potato`.
    pub ingredients: String,
    pub steps: String,
    /// Comma separated category tags.
    pub categories: String,
    pub tried: bool,
}

impl RecipeForm {
    /// Prefill a form from an existing recipe for editing. Categories outside
    /// the vocabulary are carried over verbatim and will fail validation.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.join(", "),
            steps: recipe.steps.clone(),
            categories: recipe.category.join(", "),
            tried: recipe.tried,
        }
    }

    /// Check required fields and the category vocabulary. Nothing reaches the
    /// network unless this succeeds.
    pub fn validate(&self) -> Result<RecipeFields, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let ingredients = parse::as_list(&self.ingredients);
        if ingredients.is_empty() {
            return Err(ValidationError::MissingIngredients);
        }
        let categories = parse::as_categories(&self.categories)?;
        Ok(RecipeFields {
            title: title.to_owned(),
            ingredients,
            steps: self.steps.trim().to_owned(),
            categories,
            tried: self.tried,
        })
    }
}

/// Validated recipe fields ready to be sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: String,
    pub categories: Vec<Category>,
    pub tried: bool,
}

/// Collects the distinct ingredient strings of a set of recipes.
///
/// Ingredients are compared by exact value, so `Onion` and `onion` are two
/// entries.
#[derive(Debug, Default)]
pub struct IngredientManifest {
    inner: BTreeSet<String>,
}

impl IngredientManifest {
    pub fn new() -> Self {
        Self {
            inner: BTreeSet::new(),
        }
    }

    pub fn accumulate_from(&mut self, r: &Recipe) {
        self.inner.extend(r.ingredients.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn ingredients(self) -> Vec<String> {
        self.inner.into_iter().collect()
    }
}
