//! Basic task list usage
//!
//! Walks through add, toggle, filter, edit and delete against a file-backed
//! store, writing the whole sequence through after every change.
//!
//! Run with: cargo run --example basic_usage

use chrono::Utc;
use eyre::Result;
use taskify::{Deletion, FileStorage, FilterMode, Storage, persist, view};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let storage = FileStorage::open(temp_dir.path())?;
    let key = persist::DEFAULT_KEY;

    println!("Taskify Basic Usage");
    println!("===================\n");
    println!("Storage path: {}\n", storage.dir().display());

    let mut store = persist::load(&storage, key)?;
    println!("Loaded {} saved tasks.\n", store.len());

    // ADD
    println!("1. ADD - Adding two tasks...");
    let milk = store.add("Buy milk", None).map(|t| t.id);
    store.add("Call Bob", Some("2025-01-01"));
    store.add("   ", None); // blank, ignored
    persist::save(&storage, key, &store)?;
    println!("   Store now holds {} tasks.\n", store.len());

    // TOGGLE
    println!("2. TOGGLE - Completing \"Buy milk\"...");
    if let Some(id) = milk {
        store.toggle(id);
        persist::save(&storage, key, &store)?;
    }

    // FILTER
    for mode in FilterMode::ALL {
        println!("\n3. FILTER - {}", mode);
        print!("{}", view::render(&store.filter(mode), mode, Utc::now()));
    }
    println!();

    // EDIT
    println!("4. EDIT - Renaming \"Buy milk\"...");
    if let Some(id) = milk {
        store.edit(id, "Buy oat milk");
        persist::save(&storage, key, &store)?;
    }

    // DELETE
    println!("5. DELETE - Declining, then confirming...");
    if let Some(id) = milk {
        let declined = store.delete(id, &mut false);
        println!("   First attempt: {:?}", declined);
        if let Deletion::Removed(task) = store.delete(id, &mut true) {
            persist::save(&storage, key, &store)?;
            println!("   Removed: {}", task.text);
        }
    }
    println!();

    // RELOAD
    let reloaded = persist::load(&storage, key)?;
    println!("Reloaded {} tasks from disk.", reloaded.len());
    println!("Raw blob: {}", storage.get(key)?.unwrap_or_default());

    println!("\nDemo complete!");
    Ok(())
}
