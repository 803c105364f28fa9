/*
Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use thiserror::Error;

/// The translator recognizes exactly one error kind: parse failure. Anything
/// else about the input program is undefined behavior that propagates
/// silently into the emitted IR rather than being reported here.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Syntax Error: {0}")]
    ParseError(#[from] pest::error::Error<crate::parser::Rule>),
}
