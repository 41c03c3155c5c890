//! Checked-in protobuf bindings generated with `buf generate` from `proto/`.

pub mod storage {
    pub mod v1 {
        include!("generated/storage/v1/storage.v1.rs");
    }
}
