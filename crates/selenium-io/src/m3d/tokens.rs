// Copyright 2025 eraflo
//
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

//! Whitespace-separated token stream of an M3D file.

use super::error::M3dError;
use selenium_core::math::{Quaternion, Vec3};
use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};

pub(super) struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
    position: usize,
}

impl<'a> Tokens<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace().peekable(),
            position: 0,
        }
    }

    pub(super) fn next(&mut self, expected: &'static str) -> Result<&'a str, M3dError> {
        let token = self
            .inner
            .next()
            .ok_or(M3dError::UnexpectedEof { expected })?;
        self.position += 1;
        Ok(token)
    }

    pub(super) fn peek(&mut self) -> Option<&'a str> {
        self.inner.peek().copied()
    }

    /// Skips a label or a section banner. Labels are not checked.
    pub(super) fn skip(&mut self, expected: &'static str) -> Result<(), M3dError> {
        self.next(expected).map(|_| ())
    }

    pub(super) fn parse<T: FromStr>(&mut self, expected: &'static str) -> Result<T, M3dError> {
        let position = self.position;
        let token = self.next(expected)?;
        token.parse().map_err(|_| M3dError::BadToken {
            expected,
            found: token.to_owned(),
            position,
        })
    }

    /// Reads `<label> <value>`.
    pub(super) fn labeled<T: FromStr>(&mut self, expected: &'static str) -> Result<T, M3dError> {
        self.skip(expected)?;
        self.parse(expected)
    }

    pub(super) fn floats<const N: usize>(&mut self, expected: &'static str) -> Result<[f32; N], M3dError> {
        let mut out = [0.0; N];
        for value in out.iter_mut() {
            *value = self.parse(expected)?;
        }
        Ok(out)
    }

    /// Reads `<label> x y z`.
    pub(super) fn labeled_vec3(&mut self, expected: &'static str) -> Result<Vec3, M3dError> {
        self.skip(expected)?;
        Ok(Vec3::from(self.floats::<3>(expected)?))
    }

    /// Reads `<label> x y z w`.
    pub(super) fn labeled_quat(&mut self, expected: &'static str) -> Result<Quaternion, M3dError> {
        self.skip(expected)?;
        Ok(Quaternion::from(self.floats::<4>(expected)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_position_of_bad_token() {
        let mut tokens = Tokens::new("#Bones: x");
        match tokens.labeled::<u32>("bone count") {
            Err(M3dError::BadToken {
                found, position, ..
            }) => {
                assert_eq!(found, "x");
                assert_eq!(position, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_running_out_of_tokens_is_an_error() {
        let mut tokens = Tokens::new("Pos: 1 2");
        assert!(matches!(
            tokens.labeled_vec3("position"),
            Err(M3dError::UnexpectedEof { expected: "position" })
        ));
    }
}
