//! Fake data providers exposed to scripts.
//!
//! Every provider ignores its arguments and returns a freshly generated
//! [`ScriptValue::Text`].

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::ScriptValue;

/// Signature of a builtin callable from scripts.
pub type Builtin = fn(&[ScriptValue]) -> ScriptValue;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Iris", "Jack", "Karen",
    "Liam", "Mia", "Noah", "Olivia", "Paul",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Martin",
    "Wilson", "Moore", "Taylor", "Thomas", "Lee",
];

const STREETS: &[&str] = &[
    "Main", "Oak", "Pine", "Maple", "Cedar", "Elm", "Washington", "Lake", "Hill", "Park",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court"];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const WORDS: &[&str] = &[
    "alias", "consequatur", "aut", "perferendis", "sit", "voluptatem", "accusantium", "doloremque",
    "aperiam", "eaque", "ipsa", "quae", "ab", "illo", "inventore", "veritatis", "et", "quasi",
    "architecto", "beatae", "vitae", "dicta", "sunt", "explicabo",
];

fn pick(values: &'static [&'static str]) -> &'static str {
    values.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

/// A random e-mail address.
pub fn email(_args: &[ScriptValue]) -> ScriptValue {
    let mut rng = rand::thread_rng();
    let user = format!(
        "{}.{}{}",
        pick(FIRST_NAMES).to_lowercase(),
        pick(LAST_NAMES).to_lowercase(),
        rng.gen_range(1..100)
    );
    ScriptValue::Text(format!("{user}@{}", pick(DOMAINS)))
}

/// A random street address.
pub fn address(_args: &[ScriptValue]) -> ScriptValue {
    let number = rand::thread_rng().gen_range(1..10_000);
    ScriptValue::Text(format!(
        "{number} {} {}",
        pick(STREETS),
        pick(STREET_SUFFIXES)
    ))
}

/// A random first and last name.
pub fn full_name(_args: &[ScriptValue]) -> ScriptValue {
    ScriptValue::Text(format!("{} {}", pick(FIRST_NAMES), pick(LAST_NAMES)))
}

/// A random phone number.
pub fn phone(_args: &[ScriptValue]) -> ScriptValue {
    let mut rng = rand::thread_rng();
    ScriptValue::Text(format!(
        "{}-{}-{:04}",
        rng.gen_range(200..1000),
        rng.gen_range(200..1000),
        rng.gen_range(0..10_000)
    ))
}

/// A few random words separated by spaces.
pub fn words(_args: &[ScriptValue]) -> ScriptValue {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(1..=5);
    let words = WORDS
        .choose_multiple(&mut rng, count)
        .copied()
        .collect::<Vec<_>>();
    ScriptValue::Text(words.join(" "))
}

/// The builtins by their script name.
pub fn builtins() -> IndexMap<&'static str, Builtin> {
    IndexMap::from([
        ("email", email as Builtin),
        ("address", address),
        ("fullName", full_name),
        ("phone", phone),
        ("words", words),
    ])
}
