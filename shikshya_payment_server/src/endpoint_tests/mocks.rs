use mockall::mock;
use shikshya_payment_engine::{
    db_types::{Enrollment, NewOrder, Order, PaymentMethod},
    traits::{SettlementDatabase, StorageError},
};

mock! {
    pub SettlementDb {}
    impl SettlementDatabase for SettlementDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, StorageError>;
        async fn fetch_orders_by_transaction_uuid(&self, user_id: &str, uuid: &str) -> Result<Vec<Order>, StorageError>;
        async fn fetch_orders_by_payment_reference(&self, user_id: &str, reference: &str) -> Result<Vec<Order>, StorageError>;
        async fn fetch_pending_orders(&self, user_id: &str, method: PaymentMethod) -> Result<Vec<Order>, StorageError>;
        async fn complete_order(&self, id: i64, payment_reference: &str) -> Result<Option<Order>, StorageError>;
        async fn enroll_if_absent(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError>;
        async fn fetch_enrollment(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, StorageError>;
        async fn add_cart_item(&self, user_id: &str, course_id: &str) -> Result<(), StorageError>;
        async fn remove_cart_item(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError>;
        async fn platform_commission_rate(&self) -> Result<f64, StorageError>;
        async fn set_platform_commission_rate(&self, rate: f64) -> Result<(), StorageError>;
    }
}
