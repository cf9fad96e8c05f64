#![no_main]

use estate_custody::registry::{BeneficiaryRegistry, FULL_ALLOCATION, MAX_BENEFICIARIES};
use estate_custody::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Each pair of bytes is one edit: the first picks add/remove and one of
    // 16 addresses, the second is the percentage.
    let mut registry = BeneficiaryRegistry::new();
    for op in data.chunks_exact(2) {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x01;
        bytes[19] = op[0] & 0x0f;
        let address = Address::new(bytes);

        if op[0] & 0x80 == 0 {
            let _ = registry.add(address, op[1]);
        } else {
            let _ = registry.remove(&address);
        }

        assert!(registry.determined_percentage() <= FULL_ALLOCATION);
        assert!(registry.active_count() <= MAX_BENEFICIARIES);
    }
});
