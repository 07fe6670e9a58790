// Copyright 2016 The Grin Developers
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pool server wiring: configuration, the block-notify listener, and
//! stratum task construction from daemon block templates.

pub mod blocknotify;
pub mod config;
pub mod task;

pub use blocknotify::BlockNotifyListener;
pub use config::Config;
pub use task::{DaemonWatcher, Publisher, TaskConstructor, TaskError, TaskMessage};
