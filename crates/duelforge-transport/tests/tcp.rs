//! Integration tests for the TCP transport: bind, accept, byte-at-a-time
//! receive, and clean-close detection.

use duelforge_transport::{Connection, TcpTransport, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn bind_local() -> (TcpTransport, String) {
    let transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport
        .local_addr()
        .expect("should have local addr")
        .to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_accept_and_recv_single_bytes() {
    let (mut transport, addr) = bind_local().await;

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(b"ab").await.expect("write");
        stream
    });

    let conn = transport.accept().await.expect("accept");
    // Bytes arrive one at a time regardless of how the client batched them.
    assert_eq!(conn.recv_byte().await.expect("recv"), Some(b'a'));
    assert_eq!(conn.recv_byte().await.expect("recv"), Some(b'b'));

    drop(client.await.expect("client task"));
    // After the client hangs up, recv_byte reports the clean close.
    assert_eq!(conn.recv_byte().await.expect("recv"), None);
}

#[tokio::test]
async fn test_send_reaches_client() {
    let (mut transport, addr) = bind_local().await;

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        let mut buf = vec![0u8; 5];
        stream.read_exact(&mut buf).await.expect("read");
        buf
    });

    let conn = transport.accept().await.expect("accept");
    conn.send(b"hello").await.expect("send");

    assert_eq!(client.await.expect("client task"), b"hello");
}

#[tokio::test]
async fn test_connections_get_unique_ids_and_peer_addrs() {
    let (mut transport, addr) = bind_local().await;

    let addr2 = addr.clone();
    let _c1 = tokio::spawn(async move { TcpStream::connect(addr).await });
    let conn1 = transport.accept().await.expect("accept");
    let _c2 = tokio::spawn(async move { TcpStream::connect(addr2).await });
    let conn2 = transport.accept().await.expect("accept");

    assert_ne!(conn1.id(), conn2.id());
    assert_ne!(conn1.peer_addr(), conn2.peer_addr());
}

#[tokio::test]
async fn test_close_signals_client() {
    let (mut transport, addr) = bind_local().await;

    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.expect("read to end");
        buf
    });

    let conn = transport.accept().await.expect("accept");
    conn.send(b"bye").await.expect("send");
    conn.close().await.expect("close");

    assert_eq!(client.await.expect("client task"), b"bye");
}
