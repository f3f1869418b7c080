//! End-to-end dispatch through a real listener.

use std::sync::Arc;

use portal::config::Config;

mod common;

use common::route;

async fn get(proxy: std::net::SocketAddr, host: &str, path: &str) -> (u16, String) {
    let response = reqwest::Client::new()
        .get(format!("http://{}{}", proxy, path))
        .header("Host", host)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn test_routes_by_host_case_insensitively() {
    let backend = common::start_echo_backend().await;
    let config = Config::new(
        common::temp_config_path(),
        0,
        vec![route("a.com", &format!("http://{}", backend), true)],
    );
    let (proxy, shutdown) = common::start_proxy(Arc::new(config)).await;

    let (status, body) = get(proxy, "A.COM", "/x/y?z=1").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        format!("host={} path=/x/y query=z=1 forwarded-host=A.COM", backend)
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_destination_path_prefix() {
    let backend = common::start_echo_backend().await;
    let config = Config::new(
        common::temp_config_path(),
        0,
        vec![route("api.local", &format!("http://{}/v1?key=k", backend), true)],
    );
    let (proxy, shutdown) = common::start_proxy(Arc::new(config)).await;

    let (status, body) = get(proxy, "api.local", "/users?page=2").await;
    assert_eq!(status, 200);
    assert!(body.contains("path=/v1/users query=key=k&page=2"), "{}", body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_dispatch_failures() {
    let dead = common::closed_port().await;
    let config = Config::new(
        common::temp_config_path(),
        0,
        vec![
            route("b.com", "http://127.0.0.1:1", false),
            route("bad.com", "::not a url", true),
            route("down.com", &format!("http://127.0.0.1:{}", dead), true),
        ],
    );
    let (proxy, shutdown) = common::start_proxy(Arc::new(config)).await;

    assert_eq!(get(proxy, "b.com", "/").await, (404, "Host not found".to_string()));
    assert_eq!(get(proxy, "nobody.com", "/").await, (404, "Host not found".to_string()));
    assert_eq!(get(proxy, "bad.com", "/").await, (500, "Invalid URL format".to_string()));
    assert_eq!(get(proxy, "down.com", "/").await, (502, "Bad Gateway".to_string()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_edits_are_visible_to_dispatch() {
    let backend = common::start_echo_backend().await;
    let path = common::temp_config_path();
    let config = Arc::new(Config::new(&path, 0, Vec::new()));
    let (proxy, shutdown) = common::start_proxy(Arc::clone(&config)).await;

    assert_eq!(get(proxy, "new.com", "/").await.0, 404);

    let index = config.add_route("New.com", &format!("http://{}", backend)).unwrap();
    assert_eq!(get(proxy, "new.com", "/").await.0, 404);

    assert!(config.toggle_route(index).unwrap());
    assert_eq!(get(proxy, "new.com", "/").await.0, 200);

    config.delete_route(index).unwrap();
    assert_eq!(get(proxy, "new.com", "/").await.0, 404);

    shutdown.trigger();
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_failed_save_still_applies_to_dispatch() {
    let backend = common::start_echo_backend().await;
    let path = std::env::temp_dir()
        .join(format!("portal-missing-{}", uuid::Uuid::new_v4()))
        .join("config.json");
    let config = Arc::new(Config::new(
        &path,
        0,
        vec![route("a.com", &format!("http://{}", backend), false)],
    ));
    let (proxy, shutdown) = common::start_proxy(Arc::clone(&config)).await;

    assert!(config.toggle_route(0).is_err());
    assert_eq!(get(proxy, "a.com", "/").await.0, 200);
    assert!(!path.exists());

    shutdown.trigger();
}
