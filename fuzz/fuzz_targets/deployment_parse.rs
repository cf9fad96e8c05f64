#![no_main]

use estate_custody::MAX_BENEFICIARIES;
use estate_sandbox::Deployment;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the deployment loader, and whatever
    // it accepts must hold a sane beneficiary table.
    if let Ok(deployment) = Deployment::from_slice(data) {
        let estate = deployment.into_custody();
        let _ = estate.status(0);
        assert!(estate.determined_payout_percentage() <= 100);
        assert!(estate.active_count() <= MAX_BENEFICIARIES);
    }
});
