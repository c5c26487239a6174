mod helpers;

use helpers::{decode, query};
use minidns::record_store::HostsTable;
use minidns::{Config, RecordStore, Server};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use trust_dns_proto::op::ResponseCode;
use trust_dns_proto::rr::{RData, RecordType};

async fn start_server() -> SocketAddr {
    let hosts = HostsTable::parse("127.0.0.1 host1\n10.9.8.7 files.lan\n", "test");
    let store = Arc::new(RecordStore::Hosts(hosts));
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), store)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.block_until_done());
    addr
}

async fn exchange(client: &UdpSocket, server: SocketAddr, packet: &[u8]) -> Vec<u8> {
    client.send_to(packet, server).await.unwrap();
    let mut buf = [0u8; 1024];
    let (len, from) = timeout(Duration::from_secs(5), client.recv_from(&mut buf))
        .await
        .expect("no response from server")
        .unwrap();
    assert_eq!(from, server);
    buf[..len].to_vec()
}

#[tokio::test]
async fn test_udp_round_trip() {
    let server = start_server().await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let packet = query(100, "files.lan", RecordType::A);
    let response = decode(&exchange(&client, server, &packet).await);
    assert_eq!(response.id(), 100);
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(
        response.answers()[0].data(),
        Some(&RData::A(Ipv4Addr::new(10, 9, 8, 7)))
    );

    let packet = query(101, "nope.lan", RecordType::A);
    let response = decode(&exchange(&client, server, &packet).await);
    assert_eq!(response.response_code(), ResponseCode::NXDomain);
}

#[tokio::test]
async fn test_server_survives_garbage() {
    let server = start_server().await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let reply = exchange(&client, server, &[0x00, 0x07, 0xff]).await;
    assert_eq!(reply.len(), 12);
    assert_eq!(decode(&reply).response_code(), ResponseCode::FormErr);

    let response = decode(
        &exchange(
            &client,
            server,
            &query(102, "1.0.0.127.in-addr.arpa.", RecordType::PTR),
        )
        .await,
    );
    assert_eq!(response.id(), 102);
    assert_eq!(response.answers().len(), 1);
}

#[tokio::test]
async fn test_new_uses_configured_address() {
    let hosts = HostsTable::parse("127.0.0.1 host1\n", "test");
    let store = Arc::new(RecordStore::Hosts(hosts));
    let config = Config {
        listen_addr: Ipv4Addr::LOCALHOST.into(),
        port: 80,
        ..Config::default()
    };
    assert!(minidns::dns::new(&config, store).await.is_err());
}
