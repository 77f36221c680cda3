//! Forward maximum-match segmentation on top of the dictionary scanner
//!
//! Every offset starts with a one-character word; the scanner then stretches
//! each offset to the longest dictionary word starting there, and the text is
//! cut greedily from left to right.
//!
//! Run with `cargo run --example max_match`.

use seadat::{DoubleArrayTrie, Result, StatisticsProvider};

fn segment<'t>(
    trie: &DoubleArrayTrie<&'static str>,
    text: &'t [char],
) -> Vec<(&'t [char], Option<&'static str>)> {
    let mut word_net = vec![1usize; text.len()];
    for m in trie.searcher(text, 0) {
        if m.length > word_net[m.begin] {
            word_net[m.begin] = m.length;
        }
    }

    let mut words = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let word = &text[i..i + word_net[i]];
        words.push((word, trie.get_chars(word).copied()));
        i += word_net[i];
    }
    words
}

fn main() -> Result<()> {
    seadat::init();
    println!("=== Seadat Max-Match Demo ===\n");

    let entries = [
        ("กา", "crow"),
        ("กิน", "eat"),
        ("ข้าว", "rice"),
        ("ข้าวผัด", "fried rice"),
        ("ฉัน", "I"),
        ("ชอบ", "like"),
        ("ผัด", "stir-fry"),
        ("ພາສາ", "language"),
        ("ລາວ", "Lao"),
    ];
    let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
    let glosses: Vec<&str> = entries.iter().map(|(_, v)| *v).collect();
    let trie = DoubleArrayTrie::with_values(&keys, glosses)?;

    let stats = trie.stats();
    println!("1. Dictionary:");
    println!("   {} words in {} slots ({} bytes serialized)", trie.len(), stats.size, stats.total_size);
    println!("   Occupancy: {:.1}%", stats.occupancy() * 100.0);

    println!("\n2. Segmentation:");
    for sentence in ["ฉันชอบกินข้าวผัด", "ພາສາລາວ"] {
        let text: Vec<char> = sentence.chars().collect();
        let words: Vec<String> = segment(&trie, &text)
            .into_iter()
            .map(|(word, gloss)| {
                let word: String = word.iter().collect();
                match gloss {
                    Some(gloss) => format!("{}({})", word, gloss),
                    None => word,
                }
            })
            .collect();
        println!("   {} -> {}", sentence, words.join(" | "));
    }

    println!("\n3. Persistence:");
    let bytes = trie.array().to_bytes()?;
    let restored = DoubleArrayTrie::load(&mut seadat::io::from_slice(&bytes), trie.values().to_vec())?;
    println!("   {} bytes written, 'ข้าวผัด' -> {:?}", bytes.len(), restored.get("ข้าวผัด"));

    Ok(())
}
