pub mod mock_device;
