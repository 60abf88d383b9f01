use crate::domain::models::Guest;
use std::sync::mpsc;
use std::thread;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MAX_RESULTS: usize = 50;
pub const MIN_QUERY_CHARS: usize = 2;

/// Canonical decomposition, combining marks stripped, lowercased — accented
/// and unaccented forms of the same text compare equal.
pub fn normalize_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Fill in missing search keys from name and email; keys supplied by the
/// API are re-normalized so scoring always sees canonical text.
pub fn annotate_keys(mut guests: Vec<Guest>) -> Vec<Guest> {
    for guest in &mut guests {
        if guest.search_key.trim().is_empty() {
            let mut key = guest.name.clone();
            if let Some(email) = guest.email.as_deref() {
                key.push(' ');
                key.push_str(email);
            }
            guest.search_key = normalize_key(&key);
        } else {
            guest.search_key = normalize_key(&guest.search_key);
        }
    }
    guests
}

/// Score one query token against a candidate key, or disqualify. A token
/// absent from the key disqualifies the candidate outright, even when the
/// phone would match.
fn score_token(token: &str, key: &str, phone: &str) -> Option<i32> {
    let mut score = if key.starts_with(token) {
        3
    } else if key.contains(token) {
        // Non-prefix hits score a flat 2: the word-boundary condition here
        // holds for every non-empty key, so no separate tier exists.
        2
    } else {
        return None;
    };
    if !phone.is_empty() && phone.contains(token) {
        score += 4;
    }
    Some(score)
}

/// Rank candidates against the query: every whitespace token must appear in
/// the candidate's key (AND semantics), descending score, stable ties,
/// first `MAX_RESULTS` entries. Queries under `MIN_QUERY_CHARS` after
/// trimming yield nothing.
pub fn rank(query: &str, guests: &[Guest]) -> Vec<Guest> {
    let normalized = normalize_key(query.trim());
    if normalized.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let mut scored: Vec<(i32, &Guest)> = Vec::new();
    'guests: for guest in guests {
        let phone = normalize_key(guest.phone.as_deref().unwrap_or(""));
        let mut total = 0;
        for token in &tokens {
            match score_token(token, &guest.search_key, &phone) {
                Some(score) => total += score,
                None => continue 'guests,
            }
        }
        scored.push((total, guest));
    }
    // Vec::sort_by is stable, so ties keep input order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, guest)| guest.clone())
        .collect()
}

struct SearchRequest {
    query: String,
    guests: Vec<Guest>,
    reply: mpsc::Sender<Vec<Guest>>,
}

/// Stateless scoring engine on a dedicated thread. One request in, one
/// ranked reply out; all data crosses by message copy and nothing is held
/// between invocations.
pub struct SearchWorker {
    tx: Option<mpsc::Sender<SearchRequest>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<SearchRequest>();
        let handle = thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let ranked = rank(&request.query, &request.guests);
                // A dropped receiver means the caller superseded this
                // request; the reply is simply discarded.
                let _ = request.reply.send(ranked);
            }
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Submit one query and return the one-shot receiver for its reply.
    pub fn submit(&self, query: &str, guests: Vec<Guest>) -> mpsc::Receiver<Vec<Guest>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if let Some(tx) = &self.tx {
            let _ = tx.send(SearchRequest {
                query: query.to_string(),
                guests,
                reply: reply_tx,
            });
        }
        reply_rx
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // Closing the request channel lets the worker loop exit.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
