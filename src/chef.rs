use serde::Serialize;

/// One menu entry with the craving keywords it should match on.
struct MenuEntry {
    dish: &'static str,
    keywords: &'static [&'static str],
    description: &'static str,
    price: &'static str,
}

const MENU: [MenuEntry; 8] = [
    MenuEntry {
        dish: "Crispy Fish Burger",
        keywords: &["spicy", "crispy", "crunchy", "fried", "hot", "classic"],
        description: "Our signature Crispy Fish Burger with chipotle sauce is perfect for you! \
                      Crispy white fish with a spicy kick, creamy coleslaw, and tangy pickles.",
        price: "95 DH",
    },
    MenuEntry {
        dish: "Po Boy Sandwich",
        keywords: &["big", "hungry", "large", "filling", "sandwich", "american"],
        description: "Try our Po Boy Sandwich - it's huge! A 12-inch Moroccan baguette stuffed \
                      with big fried white fish and tartar sauce. Perfect when you're super hungry!",
        price: "70 DH",
    },
    MenuEntry {
        dish: "Msemmen Fish Tacos",
        keywords: &["fusion", "unique", "different", "moroccan", "tacos", "flatbread", "local"],
        description: "Go for our Msemmen Fish Tacos! A unique fusion of Moroccan flatbread and \
                      fresh fish. It's our most creative dish!",
        price: "45 DH",
    },
    MenuEntry {
        dish: "Fish Burger (Grilled)",
        keywords: &["healthy", "light", "grilled", "fresh", "lean", "diet"],
        description: "The Grilled Fish Burger is your best bet! Healthy grilled white fish with \
                      cheese, fresh veggies, and tartar sauce. Light but satisfying!",
        price: "90 DH",
    },
    MenuEntry {
        dish: "Octopus Burger",
        keywords: &["unique", "special", "different", "octopus", "seafood", "exotic", "adventurous"],
        description: "Be adventurous with our Octopus Burger! Crispy chopped octopus legs with \
                      salsa verde. Unique and absolutely delicious!",
        price: "110 DH",
    },
    MenuEntry {
        dish: "Calamari Burger",
        keywords: &["crispy", "rings", "calamari", "squid", "crunchy", "fried"],
        description: "You'll love our Calamari Burger! Crispy calamari rings with lettuce, \
                      pickles, and tartar sauce. Crunchy perfection!",
        price: "110 DH",
    },
    MenuEntry {
        dish: "Sardine Burger",
        keywords: &["local", "traditional", "moroccan", "sardine", "authentic", "strong"],
        description: "Try our Sardine Burger - a local favorite! Double sardine patties with \
                      caramelized onions. Authentic Essaouira flavor!",
        price: "90 DH",
    },
    MenuEntry {
        dish: "Eggplant Burger",
        keywords: &["vegetarian", "veg", "veggie", "plant", "no meat", "eggplant"],
        description: "Our Eggplant Burger is perfect for you! Crispy homemade eggplant patty \
                      with cheese and coleslaw. Vegetarian and delicious!",
        price: "90 DH",
    },
];

const FALLBACK: MenuEntry = MenuEntry {
    dish: "Crispy Fish Burger",
    keywords: &[],
    description: "Can't go wrong with our signature Crispy Fish Burger! It's our most popular \
                  dish with crispy white fish, spicy chipotle sauce, and fresh toppings.",
    price: "95 DH",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub dish: String,
    pub description: String,
    pub price: String,
}

impl From<&MenuEntry> for Recommendation {
    fn from(entry: &MenuEntry) -> Self {
        Recommendation {
            dish: entry.dish.to_string(),
            description: entry.description.to_string(),
            price: entry.price.to_string(),
        }
    }
}

/// Score each menu entry by how many of its keywords appear in the craving
/// text and return the best match. Ties go to the earliest entry in the
/// table; no match at all returns the house recommendation.
pub fn recommend(craving: &str) -> Recommendation {
    let craving = craving.to_lowercase();

    let mut best: Option<&MenuEntry> = None;
    let mut best_score = 0;
    for entry in &MENU {
        let score = entry
            .keywords
            .iter()
            .filter(|keyword| craving.contains(*keyword))
            .count();
        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    best.map(Recommendation::from)
        .unwrap_or_else(|| Recommendation::from(&FALLBACK))
}
