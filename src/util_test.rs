use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// lock
// =============================================================================

#[test]
fn lock_recovers_from_poison() {
    let mutex = std::sync::Arc::new(Mutex::new(1));
    let poisoner = mutex.clone();
    let joined = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("poison the lock");
    })
    .join();
    assert!(joined.is_err());
    assert!(mutex.is_poisoned());

    *lock(&mutex) += 1;
    assert_eq!(*lock(&mutex), 2);
}
