//! Drives a real broker and two clients over a loopback WebSocket
//! connection: publish/subscribe fan-out, unsubscribe, and payload framing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ripple_broker::Broker;
use ripple_client::{ClientEngine, ConnectOptions, Payload};

async fn spawn_broker() -> (Broker, u16) {
    let broker = Broker::new();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let running = broker.clone();
    let bind_port = port;
    tokio::spawn(async move {
        running.start("127.0.0.1", bind_port).await.unwrap();
    });

    // give the accept loop a moment to bind before clients dial it
    tokio::time::sleep(Duration::from_millis(50)).await;

    (broker, port)
}

#[tokio::test]
async fn subscriber_receives_a_published_text_message() {
    let (broker, port) = spawn_broker().await;

    let subscriber = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();
    let publisher = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();

    let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let received_clone = Arc::clone(&received);

    subscriber
        .subscribe("sensors/temp", move |_topic, payload, _props| {
            if let Payload::Text(text) = payload {
                received_clone.lock().unwrap().push(text);
            }
        })
        .await
        .unwrap();

    // let SUBACK land before publishing
    tokio::time::sleep(Duration::from_millis(50)).await;

    publisher
        .publish("sensors/temp", "21.5", None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(received.lock().unwrap().as_slice(), ["21.5".to_string()]);

    broker.stop();
}

#[tokio::test]
async fn unsubscribed_topic_no_longer_invokes_its_callback() {
    let (broker, port) = spawn_broker().await;

    let subscriber = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();
    let publisher = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();

    let call_count: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
    let call_count_clone = Arc::clone(&call_count);

    subscriber
        .subscribe("alerts", move |_topic, _payload, _props| {
            *call_count_clone.lock().unwrap() += 1;
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    subscriber.unsubscribe("alerts").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    publisher.publish("alerts", "fire", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(*call_count.lock().unwrap(), 0);

    broker.stop();
}

#[tokio::test]
async fn two_subscribers_on_the_same_topic_both_receive_the_message() {
    let (broker, port) = spawn_broker().await;

    let first = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();
    let second = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();
    let publisher = ClientEngine::connect(ConnectOptions::new("127.0.0.1", port))
        .await
        .unwrap();

    let first_count: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
    let second_count: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
    let first_clone = Arc::clone(&first_count);
    let second_clone = Arc::clone(&second_count);

    first
        .subscribe("broadcast", move |_topic, _payload, _props| {
            *first_clone.lock().unwrap() += 1;
        })
        .await
        .unwrap();
    second
        .subscribe("broadcast", move |_topic, _payload, _props| {
            *second_clone.lock().unwrap() += 1;
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    publisher.publish("broadcast", "hi", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(*first_count.lock().unwrap(), 1);
    assert_eq!(*second_count.lock().unwrap(), 1);

    broker.stop();
}
