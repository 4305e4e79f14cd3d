// proto 生成コードをインクルード。
// prost-build (tonic-build) によって生成されたファイルを使用。

pub mod usermanager {
    pub mod v1 {
        include!("usermanager.v1.rs");
    }
}
