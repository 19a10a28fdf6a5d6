//! Secret word provider.
//!
//! A fixed word list split into categories. Draws are uniform over the chosen
//! category, or over every word when no category is given.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const NATURE: &[&str] = &[
    "Volcano", "Ocean", "Forest", "Mountain", "Desert", "Rainbow", "Thunderstorm", "Aurora",
    "Glacier", "Canyon", "Waterfall", "Sunset", "Tornado", "Earthquake",
];

const FOOD: &[&str] = &[
    "Pizza", "Sushi", "Chocolate", "Ice Cream", "Burger", "Pasta", "Taco", "Sandwich", "Salad",
    "Soup", "Cake", "Cookie", "Coffee", "Tea",
];

const TECHNOLOGY: &[&str] = &[
    "Smartphone", "Computer", "Internet", "Instagram", "YouTube", "TikTok", "Netflix", "Spotify",
    "Google", "Facebook", "Twitter", "Discord", "Zoom",
];

const ANIMALS: &[&str] = &[
    "Elephant", "Dolphin", "Eagle", "Lion", "Penguin", "Butterfly", "Shark", "Tiger", "Giraffe",
    "Panda", "Owl", "Whale", "Kangaroo", "Peacock",
];

const OBJECTS: &[&str] = &[
    "Car", "Airplane", "Bicycle", "Camera", "Guitar", "Book", "Clock", "Umbrella", "Ladder",
    "Mirror", "Candle", "Backpack", "Sunglasses", "Watch",
];

const ACTIVITIES: &[&str] = &[
    "Swimming", "Dancing", "Singing", "Cooking", "Reading", "Painting", "Hiking", "Shopping",
    "Gaming", "Traveling", "Photography", "Yoga", "Meditation",
];

const PLACES: &[&str] = &[
    "Beach", "Library", "Museum", "Park", "Restaurant", "Hospital", "School", "Airport", "Hotel",
    "Gym", "Cinema", "Mall", "Church", "Stadium",
];

/// Word categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nature,
    Food,
    Technology,
    Animals,
    Objects,
    Activities,
    Places,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Nature,
        Self::Food,
        Self::Technology,
        Self::Animals,
        Self::Objects,
        Self::Activities,
        Self::Places,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nature => "nature",
            Self::Food => "food",
            Self::Technology => "technology",
            Self::Animals => "animals",
            Self::Objects => "objects",
            Self::Activities => "activities",
            Self::Places => "places",
        }
    }

    /// Words in this category.
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Self::Nature => NATURE,
            Self::Food => FOOD,
            Self::Technology => TECHNOLOGY,
            Self::Animals => ANIMALS,
            Self::Objects => OBJECTS,
            Self::Activities => ACTIVITIES,
            Self::Places => PLACES,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a category name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown word category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Every word across all categories.
pub fn all_words() -> impl Iterator<Item = &'static str> {
    Category::ALL.into_iter().flat_map(|c| c.words().iter().copied())
}

/// Draw one random word.
pub fn random_word(category: Option<Category>) -> &'static str {
    random_word_with_rng(category, &mut rand::rng())
}

pub fn random_word_with_rng<R: Rng + ?Sized>(category: Option<Category>, rng: &mut R) -> &'static str {
    if let Some(category) = category {
        let words = category.words();
        return words[rng.random_range(0..words.len())];
    }

    let total: usize = Category::ALL.iter().map(|c| c.words().len()).sum();
    let index = rng.random_range(0..total);
    all_words().nth(index).unwrap_or(NATURE[0])
}

/// Draw up to `count` distinct random words.
pub fn random_words(count: usize, category: Option<Category>) -> Vec<&'static str> {
    random_words_with_rng(count, category, &mut rand::rng())
}

pub fn random_words_with_rng<R: Rng + ?Sized>(
    count: usize,
    category: Option<Category>,
    rng: &mut R,
) -> Vec<&'static str> {
    let pool: Vec<&'static str> = match category {
        Some(category) => category.words().to_vec(),
        None => all_words().collect(),
    };
    pool.choose_multiple(rng, count).copied().collect()
}
