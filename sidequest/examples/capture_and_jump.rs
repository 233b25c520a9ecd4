//! Bookmark an answer, let the page re-render, and jump back to it
//!
//! Everything runs in-process against an in-memory page.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example capture_and_jump
//! ```

use sidequest::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("SideQuest capture & jump example\n");

    let sidequest = SideQuestBuilder::new().memory().build().await?;

    let mut page = MemoryPage::new("https://chatgpt.com/c/demo").with_title("Rust ownership questions");
    page.push_exchange(
        "Explain Rust ownership in one sentence.",
        "Every value has a single owner, and the value is dropped when the owner goes out of scope.",
    );
    page.push_exchange("What is 2+2?", "4");

    let session = sidequest.attach_observer("tab-1", page).await;
    let display = sidequest.display();

    let captured = display.capture_latest().await?;
    let thread_id = captured.thread_id.unwrap_or_default();
    println!("Bookmarked thread {} (via {:?})", thread_id, captured.via);

    for id in display.list_threads().await?.order {
        println!("  - {}", id);
    }

    // The page throws away its DOM and builds it again
    session.observer().with_host(|page| page.rerender()).await;

    display.jump_to_thread(&thread_id).await?;
    let scrolled = session.observer().with_host(|page| page.scrolled_to().to_vec()).await;
    println!("\nJumped after re-render, scrolled to regions {:?}", scrolled);

    sidequest.detach(session).await;
    match display.capture_latest().await {
        Err(BusError::NoActiveTarget) => println!("Page closed: capture now reports no-active-target"),
        other => println!("Unexpected: {:?}", other),
    }

    sidequest.shutdown();
    Ok(())
}
