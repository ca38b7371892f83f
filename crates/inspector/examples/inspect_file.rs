//! Inspect a local HTML file and print its tree

use inspector::{InspectorEvent, InspectorSession, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: inspect_file <page.html>")?;

    let session = InspectorSession::new(SessionConfig::default());
    let mut events = session.event_bus.subscribe();

    let source = path.clone();
    let outcome = session
        .load(format!("file://{}", path), async move {
            tokio::fs::read_to_string(&source).await
        })
        .await?;
    println!("Outcome: {:?}", outcome);

    let tree = session.tree().await.ok_or("nothing published")?;
    println!("{}", tree.to_json_pretty()?);
    println!("Nodes: {}", tree.node_count());

    // Hover the first child to show the marker mutations
    if let Some(first) = tree.elements().next() {
        let mutations = session.set_hovered(Some(&first.id)).await?;
        println!("Hover mutations: {}", serde_json::to_string(&mutations)?);
    }

    while let Ok(event) = events.try_recv() {
        if let InspectorEvent::DocumentPublished { node_count, .. } = event {
            println!("Published {} nodes", node_count);
        }
    }

    Ok(())
}
