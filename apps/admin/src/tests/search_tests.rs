use super::*;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client_core::{ClientError, Page, PageRequest};
use tokio::io::{AsyncWriteExt, BufReader};

const DELAY: Duration = Duration::from_millis(500);

/// Class names filtered by substring; remembers every query it served.
#[derive(Clone, Default)]
struct Names {
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PageSource for Names {
    type Item = &'static str;
    type Filter = String;

    async fn fetch_page(
        &self,
        request: &PageRequest<String>,
    ) -> Result<Page<&'static str>, ClientError> {
        self.queries
            .lock()
            .expect("queries")
            .push(request.filter.clone());
        let matching = ["hatha", "vinyasa flow", "yin", "yin flow"]
            .into_iter()
            .filter(|name| name.contains(request.filter.as_str()))
            .collect();
        Ok(Page::from_all(matching, request)?)
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_lines_runs_one_search() {
    let source = Names::default();
    let mut collection = RemoteCollection::new(source.clone(), 10).expect("collection");
    let mut shown = Vec::new();

    let searches = run_search(&b"y\nyi\nyin\n"[..], &mut collection, DELAY, |c| {
        shown.push(c.items().to_vec())
    })
    .await
    .expect("search");

    assert_eq!(searches, 1);
    assert_eq!(shown, vec![vec!["yin", "yin flow"]]);
    assert_eq!(*source.queries.lock().expect("queries"), vec!["yin"]);
}

#[tokio::test(start_paused = true)]
async fn pauses_between_lines_search_each_query() {
    let source = Names::default();
    let mut collection = RemoteCollection::new(source.clone(), 10).expect("collection");
    let (mut typist, terminal) = tokio::io::duplex(64);

    tokio::spawn(async move {
        typist.write_all(b"yin\n").await.expect("write");
        tokio::time::sleep(Duration::from_secs(1)).await;
        typist.write_all(b"flow\n").await.expect("write");
    });

    let searches = run_search(BufReader::new(terminal), &mut collection, DELAY, |_| {})
        .await
        .expect("search");

    assert_eq!(searches, 2);
    assert_eq!(
        *source.queries.lock().expect("queries"),
        vec!["yin", "flow"]
    );
    assert_eq!(collection.filter(), "flow");
    assert_eq!(collection.items(), &["vinyasa flow", "yin flow"]);
}

#[tokio::test(start_paused = true)]
async fn empty_input_fetches_nothing() {
    let source = Names::default();
    let mut collection = RemoteCollection::new(source.clone(), 10).expect("collection");

    let searches = run_search(&b""[..], &mut collection, DELAY, |_| {})
        .await
        .expect("search");

    assert_eq!(searches, 0);
    assert!(source.queries.lock().expect("queries").is_empty());
}
