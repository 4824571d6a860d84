//! Basic usage examples for lexidict.
//!
//! Run with `RUST_LOG=debug` to see threaded-tree rebuilds and load summaries.

use lexidict::{Dictionary, TreeKind};
use lexitree::{rank_prefix, record_selection, BalancedTree, Record};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    example_single_tree();
    example_dictionary();
}

fn example_single_tree() {
    println!("=== BalancedTree (single tree) ===\n");

    let mut tree = BalancedTree::new();
    tree.insert(Record::new("apple").with_frequency(95));
    tree.insert(Record::new("app").with_frequency(10));
    tree.insert(Record::new("application").with_frequency(50));
    tree.insert(Record::new("banana").with_frequency(80));

    // Ranked prefix query
    for r in rank_prefix(&tree, "app", 2) {
        println!("  {:<12} score {}", r.key(), r.composite_score());
    }

    // Selections outweigh raw frequency
    for _ in 0..5 {
        record_selection("app", &mut [&mut tree]);
    }
    println!("\nAfter five picks of 'app':");
    for r in rank_prefix(&tree, "app", 3) {
        println!("  {:<12} score {}", r.key(), r.composite_score());
    }
    println!("Height: {}, count: {}\n", tree.height(), tree.len());
}

fn example_dictionary() {
    println!("=== Dictionary (all three trees) ===\n");

    let dict = Dictionary::new();
    for (word, pos, meaning, freq) in [
        ("lucid", "adjective", "easily understood", 40),
        ("luminous", "adjective", "giving off light", 25),
        ("lullaby", "noun", "a soothing song", 30),
        ("lunar", "adjective", "of the moon", 55),
    ] {
        dict.insert(
            Record::new(word)
                .with_part_of_speech(pos)
                .with_meaning(meaning)
                .with_frequency(freq),
        );
    }

    println!("lunar = {:?}", dict.get("Lunar").map(|r| r.meaning));
    dict.select("lullaby");
    dict.delete("luminous");

    for kind in TreeKind::ALL {
        let top: Vec<String> = dict
            .autocomplete_in(kind, "lu", None)
            .into_iter()
            .map(|r| r.key().to_string())
            .collect();
        println!("{kind}: {top:?}");
    }

    let stats = dict.stats();
    println!("\n{stats:#?}");
}
