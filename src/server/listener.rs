// Listener construction module
// Builds the TCP listener through socket2 so the backlog is explicit

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Accept backlog; 511 matches the common nginx/redis default
const LISTEN_BACKLOG: i32 = 511;

/// Create the `TcpListener` for the given address.
///
/// Built through `socket2` rather than `TcpListener::bind` so the backlog
/// can be set and an IPv6 bind (the default `::`) also accepts IPv4 peers.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
///
/// # Returns
///
/// * `Ok(TcpListener)` - Successfully created and bound listener
/// * `Err(std::io::Error)` - Failed to create or bind socket
pub fn create_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Dual-stack: an IPv6 wildcard bind serves IPv4 clients too.
    // Must be set before bind.
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }

    // Enable SO_REUSEADDR: allows rebinding through TIME_WAIT after a restart
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    // Bind to the specified address
    socket.bind(&addr.into())?;

    socket.listen(LISTEN_BACKLOG)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
