use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One entry in a drink's recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: i64,
}

/// A catalog drink. The recipe is persisted as serialized JSON text and
/// deserialized by the store on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// Public-safe projection: ingredient names are omitted.
    pub fn short(&self) -> Value {
        let recipe: Vec<Value> = self
            .recipe
            .iter()
            .map(|i| json!({ "color": i.color, "parts": i.parts }))
            .collect();
        json!({ "id": self.id, "title": self.title, "recipe": recipe })
    }

    /// Full projection including ingredient names.
    pub fn long(&self) -> Value {
        json!({ "id": self.id, "title": self.title, "recipe": self.recipe })
    }
}
